//! ElevenLabs text-to-speech

use crate::provider::{ensure_success, RemoteError, RemoteResult, SpeechProvider};
use crate::types::{TtsRequest, VoiceSettings, DEFAULT_TTS_MODEL, DEFAULT_VOICE_ID};
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";

pub struct ElevenLabsProvider {
    client: Client,
    api_key: String,
    voice_id: String,
    model_id: String,
    base_url: String,
}

impl ElevenLabsProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_TTS_MODEL.to_string(),
            base_url: ELEVENLABS_API_URL.to_string(),
        }
    }

    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn stream_url(&self) -> String {
        format!("{}/{}/stream", self.base_url, self.voice_id)
    }
}

#[async_trait::async_trait]
impl SpeechProvider for ElevenLabsProvider {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    async fn synthesize(&self, text: &str) -> RemoteResult<Option<Bytes>> {
        let body = TtsRequest {
            text: text.to_string(),
            model_id: self.model_id.clone(),
            voice_settings: VoiceSettings::default(),
        };
        debug!("ElevenLabs request: voice={} model={}", self.voice_id, body.model_id);

        let response = self
            .client
            .post(self.stream_url())
            .header("accept", "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success("elevenlabs", response).await?;

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(RemoteError::InvalidResponse("empty audio stream".into()));
        }
        Ok(Some(audio))
    }
}
