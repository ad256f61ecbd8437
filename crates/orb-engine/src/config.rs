//! Orb configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists. Credentials can also
//! come from the environment.

use crate::controller::EngineSettings;
use crate::narrator::Collaborators;
use orb_remote::{
    AnalyticsSink, AudioSink, CommandAudioSink, CommandMusicPlayer, ElevenLabsProvider,
    MessageProvider, MusicPlayer, NullAnalytics, OfflineProvider, OpenAiProvider,
    SilentAudioSink, SilentMusicPlayer, SpeechProvider, SupabaseAnalytics, SupabaseEdge,
    DEFAULT_OPENAI_MODEL, DEFAULT_SITE_NAME, DEFAULT_TTS_MODEL, DEFAULT_VOICE_ID,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Top-level orb configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    pub speech: SpeechConfig,
    pub presence: PresenceConfig,
    pub remote: RemoteConfig,
    pub audio: AudioConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Narrations allowed per session.
    pub max_speeches: u32,
    /// Minimum gap between accepted attempts.
    pub cooldown_ms: u64,
    /// Start with the voice muted.
    pub start_muted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Idle time before the inactivity milestone fires.
    pub inactivity_ms: u64,
}

/// Where wisdom and speech come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Supabase edge functions holding the provider keys server-side.
    #[default]
    Edge,
    /// OpenAI and ElevenLabs called directly.
    Direct,
    /// Fallback messages, no audio.
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub backend: Backend,
    pub supabase_url: String,
    pub anon_key: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub elevenlabs_api_key: String,
    pub voice_id: String,
    pub tts_model: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Command that plays mp3 from stdin, e.g. `mpg123 -q -`. Empty disables playback.
    pub player: String,
    /// Command that loops the background track. Empty disables music.
    pub music_command: String,
    pub music_muted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub enabled: bool,
    pub site_name: String,
    pub page_url: Option<String>,
}

// ============================================================
// Defaults
// ============================================================

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            max_speeches: 1,
            cooldown_ms: 5_000,
            start_muted: false,
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            inactivity_ms: 66_000,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Edge,
            supabase_url: String::new(),
            anon_key: String::new(),
            openai_api_key: String::new(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            elevenlabs_api_key: String::new(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            site_name: DEFAULT_SITE_NAME.to_string(),
            page_url: None,
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl OrbConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> orb_core::Result<Self> {
        toml::from_str(content).map_err(|e| orb_core::Error::config(e.to_string()))
    }

    /// Current config as TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Overlay credentials from environment variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut String); 4] = [
            ("SUPABASE_URL", &mut self.remote.supabase_url),
            ("SUPABASE_ANON_KEY", &mut self.remote.anon_key),
            ("OPENAI_API_KEY", &mut self.remote.openai_api_key),
            ("ELEVENLABS_API_KEY", &mut self.remote.elevenlabs_api_key),
        ];
        for (var, slot) in overrides {
            if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
                tracing::debug!("{} taken from environment", var);
                *slot = value;
            }
        }
    }

    pub fn apply_process_env(&mut self) {
        self.apply_env(|var| std::env::var(var).ok());
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            max_speeches: self.speech.max_speeches,
            speech_cooldown: Duration::from_millis(self.speech.cooldown_ms),
            inactivity_timeout: Duration::from_millis(self.presence.inactivity_ms),
            voice_muted: self.speech.start_muted,
            music_muted: self.audio.music_muted,
        }
    }

    /// Build the collaborators this config describes. Anything missing
    /// degrades to a silent or offline stand-in.
    pub fn collaborators(&self) -> Collaborators {
        let remote = &self.remote;
        let (messages, speech): (Arc<dyn MessageProvider>, Arc<dyn SpeechProvider>) =
            match remote.backend {
                Backend::Edge => {
                    let edge = Arc::new(SupabaseEdge::new(&remote.supabase_url, &remote.anon_key));
                    let messages: Arc<dyn MessageProvider> = edge.clone();
                    let speech: Arc<dyn SpeechProvider> = edge;
                    (messages, speech)
                }
                Backend::Direct => {
                    let messages: Arc<dyn MessageProvider> = if remote.openai_api_key.is_empty() {
                        Arc::new(OfflineProvider::new())
                    } else {
                        Arc::new(
                            OpenAiProvider::new(&remote.openai_api_key)
                                .with_model(&remote.openai_model),
                        )
                    };
                    let speech: Arc<dyn SpeechProvider> = if remote.elevenlabs_api_key.is_empty() {
                        Arc::new(OfflineProvider::new())
                    } else {
                        Arc::new(
                            ElevenLabsProvider::new(&remote.elevenlabs_api_key)
                                .with_voice(&remote.voice_id)
                                .with_model(&remote.tts_model),
                        )
                    };
                    (messages, speech)
                }
                Backend::Offline => {
                    let offline = Arc::new(OfflineProvider::new());
                    let messages: Arc<dyn MessageProvider> = offline.clone();
                    let speech: Arc<dyn SpeechProvider> = offline;
                    (messages, speech)
                }
            };

        let audio: Arc<dyn AudioSink> = if self.audio.player.is_empty() {
            Arc::new(SilentAudioSink)
        } else {
            Arc::new(CommandAudioSink::new(&self.audio.player))
        };

        let music: Arc<dyn MusicPlayer> = if self.audio.music_command.is_empty() {
            Arc::new(SilentMusicPlayer)
        } else {
            Arc::new(CommandMusicPlayer::new(&self.audio.music_command))
        };

        let analytics: Arc<dyn AnalyticsSink> = if self.analytics.enabled {
            Arc::new(
                SupabaseAnalytics::new(&remote.supabase_url, &remote.anon_key)
                    .with_site_name(&self.analytics.site_name)
                    .with_page_url(self.analytics.page_url.clone()),
            )
        } else {
            Arc::new(NullAnalytics)
        };

        Collaborators {
            messages,
            speech,
            audio,
            music,
            analytics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_session_rules() {
        let settings = OrbConfig::default().settings();
        assert_eq!(settings.max_speeches, 1);
        assert_eq!(settings.speech_cooldown, Duration::from_millis(5_000));
        assert_eq!(settings.inactivity_timeout, Duration::from_millis(66_000));
        assert!(!settings.voice_muted);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = OrbConfig::from_toml_str(
            r#"
            [remote]
            backend = "offline"

            [audio]
            music_muted = true
            "#,
        )
        .unwrap();
        assert_eq!(config.remote.backend, Backend::Offline);
        assert!(config.audio.music_muted);
        assert_eq!(config.speech.cooldown_ms, 5_000);
        assert_eq!(config.analytics.site_name, DEFAULT_SITE_NAME);
    }

    #[test]
    fn bad_backend_is_config_error() {
        let err = OrbConfig::from_toml_str("[remote]\nbackend = \"carrier-pigeon\"").unwrap_err();
        assert!(matches!(err, orb_core::Error::ConfigError(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = OrbConfig::default();
        config.remote.backend = Backend::Direct;
        config.analytics.page_url = Some("https://orb.example".into());
        let parsed = OrbConfig::from_toml_str(&config.to_toml()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn env_overrides_credentials() {
        let env: HashMap<&str, &str> = [
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("OPENAI_API_KEY", "sk-test"),
            ("ELEVENLABS_API_KEY", ""),
        ]
        .into_iter()
        .collect();
        let mut config = OrbConfig::default();
        config.remote.elevenlabs_api_key = "from-file".into();
        config.apply_env(|var| env.get(var).map(|v| v.to_string()));

        assert_eq!(config.remote.supabase_url, "https://x.supabase.co");
        assert_eq!(config.remote.openai_api_key, "sk-test");
        assert_eq!(config.remote.elevenlabs_api_key, "from-file");
        assert!(config.remote.anon_key.is_empty());
    }

    #[test]
    fn load_reads_file_and_survives_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orbstare.toml");
        std::fs::write(&path, "[presence]\ninactivity_ms = 10000\n").unwrap();
        assert_eq!(OrbConfig::load(&path).presence.inactivity_ms, 10_000);

        std::fs::write(&path, "[presence\ninactivity_ms = ").unwrap();
        assert_eq!(OrbConfig::load(&path), OrbConfig::default());
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let config = OrbConfig::load(Path::new("/nonexistent/orbstare.toml"));
        assert_eq!(config, OrbConfig::default());
    }

    #[test]
    fn collaborators_for_every_backend() {
        for backend in [Backend::Edge, Backend::Direct, Backend::Offline] {
            let mut config = OrbConfig::default();
            config.remote.backend = backend;
            let c = config.collaborators();
            assert!(!c.messages.name().is_empty());
        }
    }
}
