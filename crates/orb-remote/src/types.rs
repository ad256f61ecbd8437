//! Wire types for the remote backends

use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_VOICE_ID: &str = "wNvqdMNs9MLd1PG6uWuY";
pub const DEFAULT_TTS_MODEL: &str = "eleven_monolingual_v1";
pub const DEFAULT_SITE_NAME: &str = "stare-at-the-orb";

pub const ORACLE_SYSTEM_PROMPT: &str = "You are a cosmic oracle that speaks profound nonsense. \
    Mix deep spiritual concepts with absurd everyday observations. Be mystical yet hilariously \
    illogical. Keep responses under 15 words. Make it sound wise but completely ridiculous.";

pub const ORACLE_USER_PROMPT: &str = "Speak cosmic wisdom that makes no sense.";

// ---------------------------------------------------------------------------
// Edge functions
// ---------------------------------------------------------------------------

/// Body of `generate-message` responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `generate-speech` requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
}

// ---------------------------------------------------------------------------
// OpenAI chat completions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn oracle(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: ORACLE_SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: ORACLE_USER_PROMPT.into(),
                },
            ],
            max_tokens: 30,
            temperature: 0.9,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatMessage>,
}

impl ChatResponse {
    /// First non-empty completion text, trimmed.
    pub fn first_text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// ElevenLabs text-to-speech
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TtsRequest {
    pub text: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.6,
            similarity_boost: 0.7,
            style: 0.4,
            use_speaker_boost: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Row inserted into the `site_events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteEventRecord {
    pub site_name: String,
    pub event_name: String,
    pub event_data: serde_json::Value,
    pub timestamp: String,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
