//! Orbstare Remote - adapters for the collaborators the orb talks to:
//! wisdom generation, speech synthesis, playback, music and analytics.

pub mod analytics;
pub mod edge;
pub mod elevenlabs;
pub mod openai;
pub mod playback;
pub mod provider;
pub mod types;

pub use analytics::{NullAnalytics, SupabaseAnalytics};
pub use edge::SupabaseEdge;
pub use elevenlabs::ElevenLabsProvider;
pub use openai::OpenAiProvider;
pub use playback::{CommandAudioSink, CommandMusicPlayer, SilentAudioSink, SilentMusicPlayer};
pub use provider::{
    AnalyticsSink, AudioSink, MessageProvider, MusicPlayer, OfflineProvider, RemoteError,
    RemoteResult, SpeechProvider,
};
pub use types::*;
