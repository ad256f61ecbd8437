//! Narrator: resolves text, synthesizes, and plays one accepted narration
//!
//! Every failure degrades instead of propagating. Message errors fall back to
//! a canned line, speech and playback errors leave the orb silent, and all of
//! it is reported through [`NarrationEvent::Track`].

use crate::speech::SpeechTicket;
use orb_core::narration::random_fallback;
use orb_core::AnalyticsEvent;
use orb_remote::{
    AnalyticsSink, AudioSink, MessageProvider, MusicPlayer, NullAnalytics, OfflineProvider,
    SilentAudioSink, SilentMusicPlayer, SpeechProvider,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The external collaborators a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub messages: Arc<dyn MessageProvider>,
    pub speech: Arc<dyn SpeechProvider>,
    pub audio: Arc<dyn AudioSink>,
    pub music: Arc<dyn MusicPlayer>,
    pub analytics: Arc<dyn AnalyticsSink>,
}

impl Collaborators {
    /// Fallback text only, no audio, no analytics.
    pub fn offline() -> Self {
        let offline = Arc::new(OfflineProvider::new());
        Self {
            messages: offline.clone(),
            speech: offline,
            audio: Arc::new(SilentAudioSink),
            music: Arc::new(SilentMusicPlayer),
            analytics: Arc::new(NullAnalytics),
        }
    }
}

/// Progress reported while a narration runs.
#[derive(Debug, Clone, PartialEq)]
pub enum NarrationEvent {
    MessageResolved(String),
    Track(AnalyticsEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationOutcome {
    Played,
    SkippedMuted,
    /// No speech backend produced audio.
    Silent,
    Failed(String),
    /// The session ended before the sequence completed.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationReport {
    pub text: Option<String>,
    pub outcome: NarrationOutcome,
}

impl NarrationReport {
    pub fn cancelled() -> Self {
        Self {
            text: None,
            outcome: NarrationOutcome::Cancelled,
        }
    }
}

pub struct Narrator {
    messages: Arc<dyn MessageProvider>,
    speech: Arc<dyn SpeechProvider>,
    audio: Arc<dyn AudioSink>,
}

impl Narrator {
    pub fn new(collaborators: &Collaborators) -> Self {
        Self {
            messages: collaborators.messages.clone(),
            speech: collaborators.speech.clone(),
            audio: collaborators.audio.clone(),
        }
    }

    /// Run one narration to completion. Never fails; the outcome says how far
    /// it got.
    pub async fn narrate<F>(&self, ticket: SpeechTicket, emit: F) -> NarrationReport
    where
        F: Fn(NarrationEvent) + Send + Sync,
    {
        let ctx = ticket.context();
        let custom = ticket.text.is_some();

        let text = match ticket.text {
            Some(text) => text,
            None => match self.messages.generate_message().await {
                Ok(text) => text,
                Err(e) if e.is_not_configured() => random_fallback().to_string(),
                Err(e) => {
                    warn!("{} message generation failed: {}", self.messages.name(), e);
                    emit(NarrationEvent::Track(AnalyticsEvent::message_error(
                        &ctx,
                        &e.to_string(),
                    )));
                    random_fallback().to_string()
                }
            },
        };

        info!(source = %ctx.source, "Oracle: {}", text);
        emit(NarrationEvent::MessageResolved(text.clone()));
        emit(NarrationEvent::Track(AnalyticsEvent::ai_message_generated(
            &ctx, &text, custom,
        )));

        if ticket.voice_muted {
            debug!("Voice muted, skipping synthesis");
            emit(NarrationEvent::Track(AnalyticsEvent::voice_skipped_muted(
                &ctx, &text,
            )));
            return NarrationReport {
                text: Some(text),
                outcome: NarrationOutcome::SkippedMuted,
            };
        }

        let outcome = match self.speech.synthesize(&text).await {
            Ok(None) => NarrationOutcome::Silent,
            Ok(Some(audio)) => match self.audio.play(audio).await {
                Ok(()) => {
                    emit(NarrationEvent::Track(AnalyticsEvent::voice_played(
                        &ctx, &text,
                    )));
                    NarrationOutcome::Played
                }
                Err(e) => {
                    warn!("Playback failed: {}", e);
                    emit(NarrationEvent::Track(AnalyticsEvent::voice_error(
                        &ctx,
                        &text,
                        &e.to_string(),
                    )));
                    NarrationOutcome::Failed(e.to_string())
                }
            },
            Err(e) => {
                warn!("{} synthesis failed: {}", self.speech.name(), e);
                emit(NarrationEvent::Track(AnalyticsEvent::voice_error(
                    &ctx,
                    &text,
                    &e.to_string(),
                )));
                NarrationOutcome::Failed(e.to_string())
            }
        };

        NarrationReport {
            text: Some(text),
            outcome,
        }
    }
}

/// Keep a music player in step with the desired on/off state until the
/// sender goes away, then stop it.
pub(crate) async fn drive_music(
    player: Arc<dyn MusicPlayer>,
    mut desired: tokio::sync::watch::Receiver<bool>,
) {
    loop {
        let playing = *desired.borrow_and_update();
        let result = if playing {
            player.resume().await
        } else {
            player.pause().await
        };
        if let Err(e) = result {
            warn!("Music {} failed: {}", if playing { "resume" } else { "pause" }, e);
        }
        if desired.changed().await.is_err() {
            break;
        }
    }
    if let Err(e) = player.pause().await {
        warn!("Music stop failed: {}", e);
    }
}
