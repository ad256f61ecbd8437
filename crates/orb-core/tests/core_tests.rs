//! Tests for orb-core: formulas, snapshot helpers, analytics payloads, errors

use orb_core::narration;
use orb_core::*;
use std::time::Duration;

// ===========================================================================
// IntensityLevel
// ===========================================================================

#[test]
fn intensity_matches_formula_for_every_second() {
    for elapsed in 0..1_000u64 {
        let expected = (1 + elapsed / 15).min(10) as u8;
        assert_eq!(IntensityLevel::for_elapsed(elapsed).get(), expected, "elapsed={}", elapsed);
    }
}

#[test]
fn intensity_is_non_decreasing() {
    let mut prev = IntensityLevel::for_elapsed(0);
    for elapsed in 1..500u64 {
        let next = IntensityLevel::for_elapsed(elapsed);
        assert!(next >= prev);
        prev = next;
    }
}

#[test]
fn intensity_reaches_max_at_135() {
    assert_eq!(IntensityLevel::for_elapsed(134).get(), 9);
    assert!(IntensityLevel::for_elapsed(135).is_max());
    assert!(IntensityLevel::for_elapsed(u64::MAX).is_max());
}

// ===========================================================================
// Wild mode formulas
// ===========================================================================

#[test]
fn wild_interval_shrinks_to_floor() {
    assert_eq!(wild_interval_secs(0), 25);
    assert_eq!(wild_interval_secs(14), 25);
    assert_eq!(wild_interval_secs(15), 23);
    assert_eq!(wild_interval_secs(40), 21);
    assert_eq!(wild_interval_secs(120), 9);
    assert_eq!(wild_interval_secs(135), 8);
    assert_eq!(wild_interval_secs(10_000), 8);
}

#[test]
fn wild_duration_grows_and_caps() {
    assert_eq!(wild_duration(0), Duration::from_millis(2_000));
    assert_eq!(wild_duration(15), Duration::from_millis(2_500));
    assert_eq!(wild_duration(21), Duration::from_millis(2_700));
    assert_eq!(wild_duration(126), Duration::from_millis(6_200));
    assert_eq!(wild_duration(240), Duration::from_millis(10_000));
    assert_eq!(wild_duration(u64::MAX), Duration::from_millis(10_000));
}

// ===========================================================================
// SessionTime
// ===========================================================================

#[test]
fn session_time_arithmetic() {
    let t = SessionTime::from_secs(2);
    assert_eq!(t.as_millis(), 2_000);
    assert_eq!(t.after(Duration::from_millis(500)).as_millis(), 2_500);
    assert_eq!(t.since(SessionTime::from_millis(500)), Duration::from_millis(1_500));
    assert_eq!(SessionTime::ZERO.since(t), Duration::ZERO);
    assert_eq!(format!("{}", t), "t+2000ms");
}

// ===========================================================================
// Enums
// ===========================================================================

#[test]
fn milestone_spent_states() {
    assert!(!MilestoneState::Armed.is_spent());
    assert!(MilestoneState::Fired.is_spent());
    assert!(MilestoneState::Suppressed.is_spent());
}

#[test]
fn speech_source_tags() {
    assert_eq!(SpeechSource::OrbClick.as_str(), "orb_click");
    assert_eq!(SpeechSource::InactivityMessage.to_string(), "inactivity_message");
    let json = serde_json::to_string(&SpeechSource::UltimateMessage).unwrap();
    assert_eq!(json, r#""ultimate_message""#);
}

#[test]
fn ascension_serializes_snake_case() {
    let json = serde_json::to_string(&AscensionState::Ascended).unwrap();
    assert_eq!(json, r#""ascended""#);
    assert_eq!(AscensionState::default(), AscensionState::Dormant);
}

// ===========================================================================
// OrbSnapshot
// ===========================================================================

#[test]
fn snapshot_helpers() {
    let mut snap = OrbSnapshot {
        elapsed_secs: 135,
        max_speeches: 1,
        ..Default::default()
    };
    assert_eq!(snap.clock_display(), "2:15");
    assert_eq!(snap.title(), "STARE AT THE ORB");
    assert!(!snap.speech_used());

    snap.speeches_used = 1;
    snap.ascension = AscensionState::Ascended;
    assert!(snap.speech_used());
    assert_eq!(snap.title(), "MASTER PROCRASTINATOR");
}

#[test]
fn snapshot_json_omits_missing_message() {
    let snap = OrbSnapshot::default();
    let json = snap.to_json().unwrap();
    assert!(!json.contains("oracle_message"));
    assert!(json.contains(r#""ascension":"dormant""#));
}

// ===========================================================================
// AnalyticsEvent
// ===========================================================================

#[test]
fn event_names_match_table_vocabulary() {
    assert_eq!(EventName::UltimateAscensionAchieved.as_str(), "ultimate_ascension_achieved");
    assert_eq!(EventName::VoiceSkippedMuted.to_string(), "voice_skipped_muted");
    let json = serde_json::to_string(&EventName::InactivityMessageShown).unwrap();
    assert_eq!(json, r#""inactivity_message_shown""#);
}

#[test]
fn speech_events_carry_context() {
    let ctx = SpeechContext {
        staring_duration: 70,
        speech_count: 1,
        source: SpeechSource::InactivityMessage,
    };
    let ev = AnalyticsEvent::ai_message_generated(&ctx, "hello", true);
    assert_eq!(ev.name, EventName::AiMessageGenerated);
    assert_eq!(ev.data["staring_duration"], 70);
    assert_eq!(ev.data["speech_count"], 1);
    assert_eq!(ev.data["source"], "inactivity_message");
    assert_eq!(ev.data["custom_message"], true);

    let err = AnalyticsEvent::voice_error(&ctx, "hello", "boom");
    assert_eq!(err.data["error"], "boom");
    assert_eq!(err.data["message"], "hello");
}

#[test]
fn ascension_event_payload() {
    let ev = AnalyticsEvent::ultimate_ascension_achieved(135, IntensityLevel::MAX, 135_000, 0);
    assert_eq!(ev.data["staring_duration"], 135);
    assert_eq!(ev.data["intensity_level"], 10);
    assert_eq!(ev.data["session_duration"], 135_000);
    assert_eq!(ev.data["total_speeches"], 0);
}

#[test]
fn session_end_payload() {
    let summary = SessionSummary {
        duration_ms: 200_000,
        staring_duration: 200,
        max_intensity: 10,
        ultimate_achieved: true,
        total_speeches: 1,
    };
    let ev = AnalyticsEvent::session_end(&summary);
    assert_eq!(ev.data["duration"], 200_000);
    assert_eq!(ev.data["ultimate_achieved"], true);
}

// ===========================================================================
// Narration
// ===========================================================================

#[test]
fn fallback_pool_is_large_enough() {
    assert!(narration::FALLBACK_MESSAGES.len() >= 20);
    assert!(narration::FALLBACK_MESSAGES.contains(&narration::random_fallback()));
}

// ===========================================================================
// Error
// ===========================================================================

#[test]
fn error_display() {
    assert_eq!(Error::config("bad toml").to_string(), "config error: bad toml");
    assert_eq!(Error::SessionClosed.to_string(), "session closed");
    let io: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
    assert!(io.to_string().contains("disk"));
}
