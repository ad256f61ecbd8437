//! Analytics vocabulary: event names and their payloads
//!
//! Payload keys follow the `site_events` table the sink writes to, so
//! dashboards built against the web build keep working.

use crate::types::{IntensityLevel, SpeechSource};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    SessionStart,
    SessionEnd,
    WildModeActivated,
    InactivityMessageShown,
    UltimateAscensionAchieved,
    OrbInteraction,
    MuteToggled,
    MusicToggled,
    AiMessageGenerated,
    VoicePlayed,
    VoiceSkippedMuted,
    VoiceError,
    MessageError,
}

impl EventName {
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::SessionStart => "session_start",
            EventName::SessionEnd => "session_end",
            EventName::WildModeActivated => "wild_mode_activated",
            EventName::InactivityMessageShown => "inactivity_message_shown",
            EventName::UltimateAscensionAchieved => "ultimate_ascension_achieved",
            EventName::OrbInteraction => "orb_interaction",
            EventName::MuteToggled => "mute_toggled",
            EventName::MusicToggled => "music_toggled",
            EventName::AiMessageGenerated => "ai_message_generated",
            EventName::VoicePlayed => "voice_played",
            EventName::VoiceSkippedMuted => "voice_skipped_muted",
            EventName::VoiceError => "voice_error",
            EventName::MessageError => "message_error",
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analytics record. Timestamps and client metadata are stamped by the sink.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: EventName,
    pub data: Value,
}

/// Narration bookkeeping shared by every speech-related event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeechContext {
    pub staring_duration: u64,
    pub speech_count: u32,
    pub source: SpeechSource,
}

/// Totals reported when a session ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub duration_ms: u64,
    pub staring_duration: u64,
    pub max_intensity: u8,
    pub ultimate_achieved: bool,
    pub total_speeches: u32,
}

impl AnalyticsEvent {
    pub fn new(name: EventName, data: Value) -> Self {
        Self { name, data }
    }

    pub fn session_start() -> Self {
        Self::new(EventName::SessionStart, json!({}))
    }

    pub fn session_end(summary: &SessionSummary) -> Self {
        Self::new(
            EventName::SessionEnd,
            json!({
                "duration": summary.duration_ms,
                "staring_duration": summary.staring_duration,
                "max_intensity": summary.max_intensity,
                "ultimate_achieved": summary.ultimate_achieved,
                "total_speeches": summary.total_speeches,
            }),
        )
    }

    pub fn wild_mode_activated(staring_duration: u64, level: IntensityLevel) -> Self {
        Self::new(
            EventName::WildModeActivated,
            json!({
                "staring_duration": staring_duration,
                "intensity_level": level.get(),
            }),
        )
    }

    pub fn inactivity_message_shown(
        inactivity_ms: u64,
        staring_duration: u64,
        level: IntensityLevel,
    ) -> Self {
        Self::new(
            EventName::InactivityMessageShown,
            json!({
                "inactivity_duration": inactivity_ms,
                "staring_duration": staring_duration,
                "intensity_level": level.get(),
            }),
        )
    }

    pub fn ultimate_ascension_achieved(
        staring_duration: u64,
        level: IntensityLevel,
        session_duration_ms: u64,
        total_speeches: u32,
    ) -> Self {
        Self::new(
            EventName::UltimateAscensionAchieved,
            json!({
                "staring_duration": staring_duration,
                "intensity_level": level.get(),
                "session_duration": session_duration_ms,
                "total_speeches": total_speeches,
            }),
        )
    }

    pub fn orb_interaction(staring_duration: u64, level: IntensityLevel, speech_count: u32) -> Self {
        Self::new(
            EventName::OrbInteraction,
            json!({
                "staring_duration": staring_duration,
                "intensity_level": level.get(),
                "speech_count": speech_count,
            }),
        )
    }

    pub fn mute_toggled(
        muted: bool,
        staring_duration: u64,
        level: IntensityLevel,
        speech_count: u32,
    ) -> Self {
        Self::new(
            EventName::MuteToggled,
            json!({
                "muted": muted,
                "staring_duration": staring_duration,
                "intensity_level": level.get(),
                "speech_count": speech_count,
            }),
        )
    }

    pub fn music_toggled(muted: bool, staring_duration: u64, level: IntensityLevel) -> Self {
        Self::new(
            EventName::MusicToggled,
            json!({
                "muted": muted,
                "staring_duration": staring_duration,
                "intensity_level": level.get(),
            }),
        )
    }

    pub fn ai_message_generated(ctx: &SpeechContext, message: &str, custom_message: bool) -> Self {
        let mut data = ctx.payload();
        data["message"] = json!(message);
        data["custom_message"] = json!(custom_message);
        Self::new(EventName::AiMessageGenerated, data)
    }

    pub fn voice_played(ctx: &SpeechContext, message: &str) -> Self {
        let mut data = ctx.payload();
        data["message"] = json!(message);
        Self::new(EventName::VoicePlayed, data)
    }

    pub fn voice_skipped_muted(ctx: &SpeechContext, message: &str) -> Self {
        let mut data = ctx.payload();
        data["message"] = json!(message);
        Self::new(EventName::VoiceSkippedMuted, data)
    }

    pub fn voice_error(ctx: &SpeechContext, message: &str, error: &str) -> Self {
        let mut data = ctx.payload();
        data["message"] = json!(message);
        data["error"] = json!(error);
        Self::new(EventName::VoiceError, data)
    }

    pub fn message_error(ctx: &SpeechContext, error: &str) -> Self {
        let mut data = ctx.payload();
        data["error"] = json!(error);
        Self::new(EventName::MessageError, data)
    }
}

impl SpeechContext {
    fn payload(&self) -> Value {
        json!({
            "staring_duration": self.staring_duration,
            "speech_count": self.speech_count,
            "source": self.source.as_str(),
        })
    }
}
