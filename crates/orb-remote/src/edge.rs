//! Supabase edge functions: `generate-message` and `generate-speech`

use crate::provider::{
    ensure_success, MessageProvider, RemoteError, RemoteResult, SpeechProvider, WarnOnce,
};
use crate::types::{MessageResponse, SpeechRequest};
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

pub struct SupabaseEdge {
    client: Client,
    base_url: String,
    anon_key: String,
    warned: WarnOnce,
}

impl SupabaseEdge {
    /// `base_url` is the project URL, e.g. `https://xyz.supabase.co`. An empty
    /// URL leaves the adapter unconfigured.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            warned: WarnOnce::default(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    pub fn function_url(&self, function: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, function)
    }
}

#[async_trait::async_trait]
impl MessageProvider for SupabaseEdge {
    fn name(&self) -> &str {
        "supabase-edge"
    }

    async fn generate_message(&self) -> RemoteResult<String> {
        if !self.is_configured() {
            self.warned
                .warn("Supabase URL not configured, using fallback messages");
            return Err(RemoteError::NotConfigured("supabase url"));
        }

        let response = self
            .client
            .post(self.function_url("generate-message"))
            .bearer_auth(&self.anon_key)
            .header("content-type", "application/json")
            .send()
            .await?;
        let response = ensure_success("generate-message", response).await?;

        let body: MessageResponse = response.json().await?;
        match body.message.filter(|m| !m.trim().is_empty()) {
            Some(message) => {
                debug!("edge message: {} chars", message.len());
                Ok(message)
            }
            None => Err(RemoteError::InvalidResponse(
                "generate-message returned no message".into(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl SpeechProvider for SupabaseEdge {
    fn name(&self) -> &str {
        "supabase-edge"
    }

    async fn synthesize(&self, text: &str) -> RemoteResult<Option<Bytes>> {
        if !self.is_configured() {
            self.warned
                .warn("Supabase URL not configured, skipping speech generation");
            return Ok(None);
        }

        let response = self
            .client
            .post(self.function_url("generate-speech"))
            .bearer_auth(&self.anon_key)
            .json(&SpeechRequest {
                text: text.to_string(),
            })
            .send()
            .await?;
        let response = ensure_success("generate-speech", response).await?;

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(RemoteError::InvalidResponse(
                "generate-speech returned no audio".into(),
            ));
        }
        debug!("edge speech: {} bytes", audio.len());
        Ok(Some(audio))
    }
}
