//! OpenAI chat completions as a direct wisdom source

use crate::provider::{ensure_success, MessageProvider, RemoteError, RemoteResult};
use crate::types::{ChatRequest, ChatResponse, DEFAULT_OPENAI_MODEL};
use reqwest::Client;
use tracing::debug;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait::async_trait]
impl MessageProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate_message(&self) -> RemoteResult<String> {
        let body = ChatRequest::oracle(&self.model);
        debug!("OpenAI request: model={}", body.model);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success("openai", response).await?;

        let data: ChatResponse = response.json().await?;
        data.first_text().ok_or_else(|| {
            RemoteError::InvalidResponse("no completion in OpenAI response".into())
        })
    }
}
