//! Orbstare Engine - the engagement state machine and the loop that runs it
//!
//! [`OrbController`] owns every piece of session state and is driven purely by
//! time-stamped calls. [`OrbLoop`] wraps it with real timers, the one-second
//! tick, narration tasks and snapshot publishing.

pub mod ascension;
pub mod clock;
pub mod config;
pub mod controller;
pub mod narrator;
pub mod presence;
pub mod runtime;
pub mod speech;
pub mod timers;

pub use ascension::Ascension;
pub use clock::{EngagementClock, Tick};
pub use config::{Backend, OrbConfig};
pub use controller::{
    Effect, EngineSettings, MusicCommand, OrbController, TimerKind, ASCENSION_OVERLAY,
    INACTIVITY_OVERLAY, ORB_GLOW,
};
pub use narrator::{Collaborators, NarrationEvent, NarrationOutcome, NarrationReport, Narrator};
pub use presence::PresenceMonitor;
pub use runtime::{OrbEvent, OrbHandle, OrbLoop};
pub use speech::{Rejection, SpeechGate, SpeechRequest, SpeechTicket};
pub use timers::{TimerFired, TimerSet};
