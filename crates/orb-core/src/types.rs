//! Core types for Orbstare

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Period of the engagement clock.
pub const TICK: Duration = Duration::from_secs(1);

/// Staring seconds needed to climb one intensity level.
pub const SECONDS_PER_LEVEL: u64 = 15;

const BASE_WILD_INTERVAL_SECS: u64 = 25;
const MIN_WILD_INTERVAL_SECS: u64 = 8;
const BASE_WILD_DURATION_MS: u64 = 2_000;
const MAX_WILD_DURATION_MS: u64 = 10_000;

// ---------------------------------------------------------------------------
// Session time
// ---------------------------------------------------------------------------

/// Milliseconds since the session started. All controller operations are
/// stamped with one of these so the state machine never reads a wall clock.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionTime(u64);

impl SessionTime {
    pub const ZERO: SessionTime = SessionTime(0);

    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1_000))
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn since(self, earlier: SessionTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    pub fn after(self, delay: Duration) -> Self {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(ms))
    }
}

impl From<Duration> for SessionTime {
    fn from(d: Duration) -> Self {
        Self(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

impl std::fmt::Display for SessionTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t+{}ms", self.0)
    }
}

// ---------------------------------------------------------------------------
// Intensity
// ---------------------------------------------------------------------------

/// Escalation tier, always within `1..=10`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntensityLevel(u8);

impl IntensityLevel {
    pub const MIN: IntensityLevel = IntensityLevel(1);
    pub const MAX: IntensityLevel = IntensityLevel(10);

    /// `min(1 + floor(elapsed / 15), 10)`
    pub fn for_elapsed(elapsed_secs: u64) -> Self {
        let level = 1 + elapsed_secs / SECONDS_PER_LEVEL;
        Self(level.min(Self::MAX.0 as u64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_max(self) -> bool {
        self == Self::MAX
    }
}

impl Default for IntensityLevel {
    fn default() -> Self {
        Self::MIN
    }
}

impl std::fmt::Display for IntensityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seconds between wild bursts at the given staring time:
/// `max(8, 25 - 2 * floor(elapsed / 15))`.
pub fn wild_interval_secs(elapsed_secs: u64) -> u64 {
    let shrink = 2 * (elapsed_secs / SECONDS_PER_LEVEL);
    BASE_WILD_INTERVAL_SECS
        .saturating_sub(shrink)
        .max(MIN_WILD_INTERVAL_SECS)
}

/// Length of a wild burst started at the given staring time:
/// `min(2000 + elapsed * 500 / 15, 10000)` milliseconds.
pub fn wild_duration(elapsed_secs: u64) -> Duration {
    let growth = elapsed_secs.saturating_mul(500) / SECONDS_PER_LEVEL;
    let ms = BASE_WILD_DURATION_MS
        .saturating_add(growth)
        .min(MAX_WILD_DURATION_MS);
    Duration::from_millis(ms)
}

// ---------------------------------------------------------------------------
// State enums
// ---------------------------------------------------------------------------

/// Terminal engagement state. The only transition is Dormant -> Ascended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AscensionState {
    #[default]
    Dormant,
    Ascended,
}

/// Lifecycle of the one-shot inactivity milestone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneState {
    #[default]
    Armed,
    /// Fired after a full idle period.
    Fired,
    /// Consumed by ascension before it could fire.
    Suppressed,
}

impl MilestoneState {
    pub fn is_spent(self) -> bool {
        !matches!(self, MilestoneState::Armed)
    }
}

/// Who asked the speech gate for narration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechSource {
    OrbClick,
    InactivityMessage,
    UltimateMessage,
}

impl SpeechSource {
    pub fn as_str(self) -> &'static str {
        match self {
            SpeechSource::OrbClick => "orb_click",
            SpeechSource::InactivityMessage => "inactivity_message",
            SpeechSource::UltimateMessage => "ultimate_message",
        }
    }
}

impl std::fmt::Display for SpeechSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read-only view of a session handed to the presentation layer after every
/// state change.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbSnapshot {
    pub elapsed_secs: u64,
    pub intensity: IntensityLevel,
    pub wild_mode: bool,
    pub ascension: AscensionState,
    pub speeches_used: u32,
    pub max_speeches: u32,
    /// A narration sequence is between acceptance and completion.
    pub speaking: bool,
    pub orb_active: bool,
    pub voice_muted: bool,
    pub music_muted: bool,
    pub inactivity_message: bool,
    pub ascension_message: bool,
    /// Staring seconds when the inactivity milestone fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_secs: Option<u64>,
    /// Staring seconds at ascension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascended_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_message: Option<String>,
}

impl OrbSnapshot {
    pub fn is_ascended(&self) -> bool {
        self.ascension == AscensionState::Ascended
    }

    pub fn speech_used(&self) -> bool {
        self.speeches_used >= self.max_speeches
    }

    pub fn title(&self) -> &'static str {
        if self.is_ascended() {
            "MASTER PROCRASTINATOR"
        } else {
            "STARE AT THE ORB"
        }
    }

    /// Staring time as `m:ss`.
    pub fn clock_display(&self) -> String {
        format!("{}:{:02}", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
