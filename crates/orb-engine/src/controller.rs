//! The session controller: one owned state machine, driven by time-stamped calls
//!
//! Every operation takes the current [`SessionTime`] and returns the side
//! effects it wants performed as plain data. The controller never spawns,
//! sleeps, or talks to a collaborator itself; the runtime executes each
//! [`Effect`] independently, so one failing effect cannot block the others.

use crate::ascension::Ascension;
use crate::clock::EngagementClock;
use crate::presence::{PresenceMonitor, DEFAULT_INACTIVITY};
use crate::speech::{SpeechGate, SpeechRequest, SpeechTicket, DEFAULT_COOLDOWN, DEFAULT_MAX_SPEECHES};
use orb_core::narration::{ascension_script, inactivity_script};
use orb_core::{AnalyticsEvent, OrbSnapshot, SessionSummary, SessionTime, SpeechSource};
use std::time::Duration;
use tracing::{debug, info};

/// How long the orb keeps glowing after narration completes.
pub const ORB_GLOW: Duration = Duration::from_millis(1_000);

/// The inactivity overlay hides itself after 5s plus a 500ms fade.
pub const INACTIVITY_OVERLAY: Duration = Duration::from_millis(5_500);

/// Five 2.5s phases, a 4s hold, then a 1s fade.
pub const ASCENSION_OVERLAY: Duration = Duration::from_millis(17_500);

/// The replaceable one-shot timers a session owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    WildExpiry,
    Inactivity,
    OrbGlow,
    InactivityOverlay,
    AscensionOverlay,
}

impl TimerKind {
    pub const ALL: [TimerKind; 5] = [
        TimerKind::WildExpiry,
        TimerKind::Inactivity,
        TimerKind::OrbGlow,
        TimerKind::InactivityOverlay,
        TimerKind::AscensionOverlay,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCommand {
    Resume,
    Pause,
}

/// A side effect requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Arm `timer`, replacing any pending instance of the same kind.
    Schedule { timer: TimerKind, delay: Duration },
    Cancel(TimerKind),
    Track(AnalyticsEvent),
    /// Run an accepted narration sequence.
    Narrate(SpeechTicket),
    Music(MusicCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub max_speeches: u32,
    pub speech_cooldown: Duration,
    pub inactivity_timeout: Duration,
    pub voice_muted: bool,
    pub music_muted: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_speeches: DEFAULT_MAX_SPEECHES,
            speech_cooldown: DEFAULT_COOLDOWN,
            inactivity_timeout: DEFAULT_INACTIVITY,
            voice_muted: false,
            music_muted: false,
        }
    }
}

#[derive(Debug, Default)]
struct Overlays {
    inactivity: bool,
    ascension: bool,
    milestone_secs: Option<u64>,
    ascended_secs: Option<u64>,
}

pub struct OrbController {
    clock: EngagementClock,
    presence: PresenceMonitor,
    gate: SpeechGate,
    ascension: Ascension,
    voice_muted: bool,
    music_muted: bool,
    glowing: bool,
    overlays: Overlays,
    oracle_message: Option<String>,
    ended: bool,
}

impl Default for OrbController {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl OrbController {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            clock: EngagementClock::new(),
            presence: PresenceMonitor::new(settings.inactivity_timeout),
            gate: SpeechGate::new(settings.max_speeches, settings.speech_cooldown),
            ascension: Ascension::new(),
            voice_muted: settings.voice_muted,
            music_muted: settings.music_muted,
            glowing: false,
            overlays: Overlays::default(),
            oracle_message: None,
            ended: false,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }

    pub fn is_ascended(&self) -> bool {
        self.ascension.is_ascended()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn gate(&self) -> &SpeechGate {
        &self.gate
    }

    pub fn presence(&self) -> &PresenceMonitor {
        &self.presence
    }

    /// Session start: arm the inactivity deadline and start the music.
    pub fn start(&mut self, now: SessionTime) -> Vec<Effect> {
        info!("Orb session started");
        let mut effects = vec![Effect::Track(AnalyticsEvent::session_start())];
        if let Some(deadline) = self.presence.observe(now) {
            effects.push(Effect::Schedule {
                timer: TimerKind::Inactivity,
                delay: deadline.since(now),
            });
        }
        if !self.music_muted {
            effects.push(Effect::Music(MusicCommand::Resume));
        }
        effects
    }

    /// One engagement clock tick.
    pub fn tick(&mut self, now: SessionTime) -> Vec<Effect> {
        if self.ended {
            return Vec::new();
        }
        let tick = self.clock.advance();

        if self.ascension.should_ascend(tick.level) {
            return self.ascend(now);
        }

        match self.clock.wild_burst_due() {
            Some(duration) => {
                let until = self.clock.start_wild(now, duration);
                debug!(
                    elapsed = tick.elapsed_secs,
                    until = %until,
                    "Wild mode burst for {}ms",
                    duration.as_millis()
                );
                vec![
                    Effect::Schedule {
                        timer: TimerKind::WildExpiry,
                        delay: duration,
                    },
                    Effect::Track(AnalyticsEvent::wild_mode_activated(
                        tick.elapsed_secs,
                        tick.level,
                    )),
                ]
            }
            None => Vec::new(),
        }
    }

    /// Pointer or keyboard input observed.
    pub fn activity(&mut self, now: SessionTime) -> Vec<Effect> {
        if self.ended {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if let Some(deadline) = self.presence.observe(now) {
            effects.push(Effect::Schedule {
                timer: TimerKind::Inactivity,
                delay: deadline.since(now),
            });
        }
        if !self.music_muted {
            effects.push(Effect::Music(MusicCommand::Resume));
        }
        effects
    }

    /// The inactivity timer went off.
    pub fn inactivity_deadline(&mut self, now: SessionTime) -> Vec<Effect> {
        if self.ended || self.ascension.is_ascended() {
            return Vec::new();
        }
        if !self.presence.deadline_reached(now) {
            return Vec::new();
        }

        let elapsed = self.clock.elapsed_secs();
        info!(elapsed, "Inactivity milestone reached");
        self.overlays.inactivity = true;
        self.overlays.milestone_secs = Some(elapsed);

        let timeout_ms = self.presence.timeout().as_millis() as u64;
        let mut effects = vec![
            Effect::Schedule {
                timer: TimerKind::InactivityOverlay,
                delay: INACTIVITY_OVERLAY,
            },
            Effect::Track(AnalyticsEvent::inactivity_message_shown(
                timeout_ms,
                elapsed,
                self.clock.level(),
            )),
        ];
        effects.extend(self.request_speech(
            now,
            SpeechRequest::scripted(inactivity_script(elapsed), SpeechSource::InactivityMessage),
        ));
        effects
    }

    /// The wild burst deadline passed. Returns whether wild mode ended.
    pub fn wild_expired(&mut self, now: SessionTime) -> bool {
        self.clock.expire_wild(now)
    }

    pub fn orb_glow_expired(&mut self, _now: SessionTime) -> bool {
        std::mem::replace(&mut self.glowing, false)
    }

    pub fn click_orb(&mut self, now: SessionTime) -> Vec<Effect> {
        if self.ended {
            return Vec::new();
        }
        let mut effects = vec![Effect::Track(AnalyticsEvent::orb_interaction(
            self.clock.elapsed_secs(),
            self.clock.level(),
            self.gate.used(),
        ))];
        if self.ascension.is_ascended() || self.gate.is_exhausted() {
            debug!("Orb clicked with no narration left");
            return effects;
        }
        effects.extend(self.request_speech(now, SpeechRequest::generated(SpeechSource::OrbClick)));
        effects
    }

    pub fn toggle_voice(&mut self, _now: SessionTime) -> Vec<Effect> {
        self.voice_muted = !self.voice_muted;
        info!(muted = self.voice_muted, "Voice toggled");
        vec![Effect::Track(AnalyticsEvent::mute_toggled(
            self.voice_muted,
            self.clock.elapsed_secs(),
            self.clock.level(),
            self.gate.used(),
        ))]
    }

    pub fn toggle_music(&mut self, _now: SessionTime) -> Vec<Effect> {
        self.music_muted = !self.music_muted;
        info!(muted = self.music_muted, "Music toggled");
        let command = if self.music_muted {
            MusicCommand::Pause
        } else {
            MusicCommand::Resume
        };
        vec![
            Effect::Music(command),
            Effect::Track(AnalyticsEvent::music_toggled(
                self.music_muted,
                self.clock.elapsed_secs(),
                self.clock.level(),
            )),
        ]
    }

    pub fn dismiss_inactivity_message(&mut self) -> bool {
        std::mem::replace(&mut self.overlays.inactivity, false)
    }

    pub fn dismiss_ascension_message(&mut self) -> bool {
        std::mem::replace(&mut self.overlays.ascension, false)
    }

    /// Narration settled on its text.
    pub fn message_resolved(&mut self, text: String) {
        self.oracle_message = Some(text);
    }

    /// Narration sequence completed, successfully or not.
    pub fn narration_finished(&mut self, _now: SessionTime) -> Vec<Effect> {
        if !self.gate.finish() {
            return Vec::new();
        }
        if self.ended {
            return Vec::new();
        }
        self.glowing = true;
        vec![Effect::Schedule {
            timer: TimerKind::OrbGlow,
            delay: ORB_GLOW,
        }]
    }

    /// Enter the terminal state. A no-op returning no effects once ascended.
    ///
    /// Wild mode is pinned on and the wild and inactivity timers are
    /// cancelled. The milestone is suppressed and the ascension narration
    /// competes for the speech budget like any other requester.
    pub fn ascend(&mut self, now: SessionTime) -> Vec<Effect> {
        if self.ended || !self.ascension.ascend(now) {
            return Vec::new();
        }

        let elapsed = self.clock.elapsed_secs();
        let level = self.clock.level();
        info!(elapsed, level = level.get(), "Ultimate ascension achieved");

        self.clock.pin_wild();
        if self.presence.suppress() {
            debug!("Pending inactivity deadline suppressed by ascension");
        }
        self.overlays.ascension = true;
        self.overlays.ascended_secs = Some(elapsed);

        let mut effects = vec![
            Effect::Cancel(TimerKind::WildExpiry),
            Effect::Cancel(TimerKind::Inactivity),
            Effect::Schedule {
                timer: TimerKind::AscensionOverlay,
                delay: ASCENSION_OVERLAY,
            },
            Effect::Track(AnalyticsEvent::ultimate_ascension_achieved(
                elapsed,
                level,
                now.as_millis(),
                self.gate.used(),
            )),
        ];
        effects.extend(self.request_speech(
            now,
            SpeechRequest::scripted(ascension_script(elapsed), SpeechSource::UltimateMessage),
        ));
        effects
    }

    /// Close the session. Later calls return the same summary and no effects.
    pub fn end(&mut self, now: SessionTime) -> (SessionSummary, Vec<Effect>) {
        let summary = SessionSummary {
            duration_ms: now.as_millis(),
            staring_duration: self.clock.elapsed_secs(),
            max_intensity: self.clock.level().get(),
            ultimate_achieved: self.ascension.is_ascended(),
            total_speeches: self.gate.used(),
        };
        if std::mem::replace(&mut self.ended, true) {
            return (summary, Vec::new());
        }

        info!(
            staring = summary.staring_duration,
            speeches = summary.total_speeches,
            "Orb session ended"
        );
        let mut effects: Vec<Effect> = TimerKind::ALL.into_iter().map(Effect::Cancel).collect();
        effects.push(Effect::Music(MusicCommand::Pause));
        effects.push(Effect::Track(AnalyticsEvent::session_end(&summary)));
        (summary, effects)
    }

    pub fn snapshot(&self) -> OrbSnapshot {
        OrbSnapshot {
            elapsed_secs: self.clock.elapsed_secs(),
            intensity: self.clock.level(),
            wild_mode: self.clock.wild_active(),
            ascension: self.ascension.state(),
            speeches_used: self.gate.used(),
            max_speeches: self.gate.max(),
            speaking: self.gate.in_progress(),
            orb_active: self.gate.in_progress() || self.glowing,
            voice_muted: self.voice_muted,
            music_muted: self.music_muted,
            inactivity_message: self.overlays.inactivity,
            ascension_message: self.overlays.ascension,
            milestone_secs: self.overlays.milestone_secs,
            ascended_secs: self.overlays.ascended_secs,
            oracle_message: self.oracle_message.clone(),
        }
    }

    fn request_speech(&mut self, now: SessionTime, request: SpeechRequest) -> Option<Effect> {
        let source = request.source;
        match self
            .gate
            .attempt(now, request, self.clock.elapsed_secs(), self.voice_muted)
        {
            Ok(ticket) => {
                info!(
                    source = %source,
                    speech = ticket.speech_number,
                    "Narration accepted"
                );
                Some(Effect::Narrate(ticket))
            }
            Err(rejection) => {
                debug!(source = %source, "Narration rejected: {}", rejection);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(ctrl: &mut OrbController, secs: u64) -> Vec<Effect> {
        let mut all = Vec::new();
        while ctrl.elapsed_secs() < secs {
            let next = ctrl.elapsed_secs() + 1;
            all.extend(ctrl.tick(SessionTime::from_secs(next)));
        }
        all
    }

    fn narrations(effects: &[Effect]) -> Vec<&SpeechTicket> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Narrate(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_arms_inactivity_and_music() {
        let mut ctrl = OrbController::default();
        let effects = ctrl.start(SessionTime::ZERO);
        assert!(effects.contains(&Effect::Schedule {
            timer: TimerKind::Inactivity,
            delay: Duration::from_millis(66_000),
        }));
        assert!(effects.contains(&Effect::Music(MusicCommand::Resume)));
    }

    #[test]
    fn music_muted_session_stays_quiet() {
        let mut ctrl = OrbController::new(EngineSettings {
            music_muted: true,
            ..Default::default()
        });
        assert!(!ctrl.start(SessionTime::ZERO).contains(&Effect::Music(MusicCommand::Resume)));
        assert!(!ctrl.activity(SessionTime::from_secs(3)).contains(&Effect::Music(MusicCommand::Resume)));
    }

    #[test]
    fn ascension_effect_order() {
        let mut ctrl = OrbController::default();
        ctrl.start(SessionTime::ZERO);
        let effects = run_ticks(&mut ctrl, 135);
        let tail = &effects[effects.len() - 5..];
        assert_eq!(tail[0], Effect::Cancel(TimerKind::WildExpiry));
        assert_eq!(tail[1], Effect::Cancel(TimerKind::Inactivity));
        assert_eq!(
            tail[2],
            Effect::Schedule {
                timer: TimerKind::AscensionOverlay,
                delay: ASCENSION_OVERLAY
            }
        );
        assert!(matches!(&tail[3], Effect::Track(e) if e.name == orb_core::EventName::UltimateAscensionAchieved));
        assert!(matches!(&tail[4], Effect::Narrate(t) if t.source == SpeechSource::UltimateMessage));
    }

    #[test]
    fn glow_follows_narration() {
        let mut ctrl = OrbController::default();
        ctrl.start(SessionTime::ZERO);
        let effects = ctrl.click_orb(SessionTime::from_secs(2));
        assert_eq!(narrations(&effects).len(), 1);
        assert!(ctrl.snapshot().orb_active);
        assert!(ctrl.snapshot().speaking);

        let effects = ctrl.narration_finished(SessionTime::from_secs(4));
        assert_eq!(
            effects,
            vec![Effect::Schedule {
                timer: TimerKind::OrbGlow,
                delay: ORB_GLOW
            }]
        );
        let snap = ctrl.snapshot();
        assert!(!snap.speaking);
        assert!(snap.orb_active);

        assert!(ctrl.orb_glow_expired(SessionTime::from_secs(5)));
        assert!(!ctrl.snapshot().orb_active);
    }

    #[test]
    fn end_is_idempotent() {
        let mut ctrl = OrbController::default();
        ctrl.start(SessionTime::ZERO);
        run_ticks(&mut ctrl, 20);
        let (summary, effects) = ctrl.end(SessionTime::from_millis(20_500));
        assert_eq!(summary.duration_ms, 20_500);
        assert_eq!(summary.staring_duration, 20);
        assert_eq!(summary.max_intensity, 2);
        assert!(effects.iter().any(|e| matches!(e, Effect::Track(ev) if ev.name == orb_core::EventName::SessionEnd)));

        let (again, effects) = ctrl.end(SessionTime::from_secs(30));
        assert!(effects.is_empty());
        assert_eq!(again.staring_duration, 20);
        assert!(ctrl.tick(SessionTime::from_secs(21)).is_empty());
    }
}
