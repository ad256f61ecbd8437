//! Collaborator traits and the shared error type

use bytes::Bytes;
use orb_core::AnalyticsEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, RemoteError::NotConfigured(_))
    }
}

/// Produces a line of cosmic wisdom.
#[async_trait::async_trait]
pub trait MessageProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate_message(&self) -> RemoteResult<String>;
}

/// Turns text into encoded audio.
#[async_trait::async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` means no speech backend is available and narration should
    /// stay silent.
    async fn synthesize(&self, text: &str) -> RemoteResult<Option<Bytes>>;
}

/// Plays encoded audio and resolves once playback has finished.
#[async_trait::async_trait]
pub trait AudioSink: Send + Sync {
    async fn play(&self, audio: Bytes) -> RemoteResult<()>;
}

/// Looping background music.
#[async_trait::async_trait]
pub trait MusicPlayer: Send + Sync {
    /// Start (or keep) the loop playing. Calling while already playing is a no-op.
    async fn resume(&self) -> RemoteResult<()>;

    async fn pause(&self) -> RemoteResult<()>;
}

/// Fire-and-forget event store.
#[async_trait::async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: AnalyticsEvent) -> RemoteResult<()>;
}

/// Stand-in for both providers when no backend is configured.
#[derive(Default)]
pub struct OfflineProvider {
    warned: WarnOnce,
}

impl OfflineProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MessageProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate_message(&self) -> RemoteResult<String> {
        self.warned
            .warn("no message backend configured, using fallback messages");
        Err(RemoteError::NotConfigured("message backend"))
    }
}

#[async_trait::async_trait]
impl SpeechProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn synthesize(&self, _text: &str) -> RemoteResult<Option<Bytes>> {
        Ok(None)
    }
}

/// Logs a configuration warning the first time only.
#[derive(Debug, Default)]
pub(crate) struct WarnOnce(AtomicBool);

impl WarnOnce {
    pub(crate) fn warn(&self, message: &str) {
        if !self.0.swap(true, Ordering::Relaxed) {
            warn!("{}", message);
        }
    }
}

/// Map a non-success HTTP status onto the error taxonomy.
pub(crate) async fn ensure_success(
    service: &str,
    response: reqwest::Response,
) -> RemoteResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!("{} error {}: {}", service, status, body);
    match status.as_u16() {
        401 | 403 => Err(RemoteError::AuthFailed(format!("{}: {}", service, body))),
        429 => Err(RemoteError::RateLimited(service.to_string())),
        _ => Err(RemoteError::RequestFailed(format!(
            "{} {}: {}",
            service, status, body
        ))),
    }
}
