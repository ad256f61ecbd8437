//! The orb loop: single consumer of session events
//!
//! All input enters through one queue: handle requests from the presentation
//! layer, narration progress, and the loop's own timers and tick. The loop
//! feeds each one to the controller, executes the returned effects, and
//! publishes a fresh snapshot to every watcher.

use crate::controller::{Effect, MusicCommand, OrbController, TimerKind};
use crate::narrator::{drive_music, Collaborators, NarrationEvent, NarrationReport, Narrator};
use crate::speech::SpeechTicket;
use crate::timers::{TimerFired, TimerSet};
use orb_core::{AnalyticsEvent, OrbSnapshot, SessionSummary, SessionTime, TICK};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long shutdown waits for in-flight analytics and music to settle.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Every event that can enter the orb queue.
#[derive(Debug, Clone, PartialEq)]
pub enum OrbEvent {
    /// Pointer, touch, or key input
    Activity,
    ClickOrb,
    ToggleVoice,
    ToggleMusic,
    DismissInactivityMessage,
    DismissAscensionMessage,
    /// Progress from a running narration
    Narration(NarrationEvent),
    NarrationFinished(NarrationReport),
    Shutdown,
}

/// Cloneable front door to a running [`OrbLoop`].
#[derive(Clone)]
pub struct OrbHandle {
    tx: mpsc::UnboundedSender<OrbEvent>,
    snapshot: watch::Receiver<OrbSnapshot>,
}

impl OrbHandle {
    fn send(&self, event: OrbEvent) -> orb_core::Result<()> {
        self.tx
            .send(event)
            .map_err(|_| orb_core::Error::SessionClosed)
    }

    pub fn activity(&self) -> orb_core::Result<()> {
        self.send(OrbEvent::Activity)
    }

    pub fn click_orb(&self) -> orb_core::Result<()> {
        self.send(OrbEvent::ClickOrb)
    }

    pub fn toggle_voice(&self) -> orb_core::Result<()> {
        self.send(OrbEvent::ToggleVoice)
    }

    pub fn toggle_music(&self) -> orb_core::Result<()> {
        self.send(OrbEvent::ToggleMusic)
    }

    pub fn dismiss_inactivity_message(&self) -> orb_core::Result<()> {
        self.send(OrbEvent::DismissInactivityMessage)
    }

    pub fn dismiss_ascension_message(&self) -> orb_core::Result<()> {
        self.send(OrbEvent::DismissAscensionMessage)
    }

    pub fn shutdown(&self) -> orb_core::Result<()> {
        self.send(OrbEvent::Shutdown)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> OrbSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrbSnapshot> {
        self.snapshot.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct OrbLoop {
    controller: OrbController,
    collaborators: Collaborators,
    narrator: Arc<Narrator>,
    events_tx: mpsc::UnboundedSender<OrbEvent>,
    events_rx: mpsc::UnboundedReceiver<OrbEvent>,
    snapshot_tx: watch::Sender<OrbSnapshot>,
    music_tx: watch::Sender<bool>,
    timers: TimerSet,
    /// Narration and analytics tasks
    tasks: JoinSet<()>,
    cancel: CancellationToken,
    started: Instant,
}

impl OrbLoop {
    /// Create a loop and the handle that drives it. Nothing runs until
    /// [`OrbLoop::run`] is awaited.
    pub fn new(controller: OrbController, collaborators: Collaborators) -> (Self, OrbHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let (music_tx, _) = watch::channel(false);

        let handle = OrbHandle {
            tx: events_tx.clone(),
            snapshot: snapshot_rx,
        };
        let orb_loop = Self {
            narrator: Arc::new(Narrator::new(&collaborators)),
            controller,
            collaborators,
            events_tx,
            events_rx,
            snapshot_tx,
            music_tx,
            timers: TimerSet::new(),
            tasks: JoinSet::new(),
            cancel: CancellationToken::new(),
            started: Instant::now(),
        };
        (orb_loop, handle)
    }

    fn now(&self) -> SessionTime {
        SessionTime::from(self.started.elapsed())
    }

    /// Run the session until [`OrbHandle::shutdown`], then return its totals.
    pub async fn run(mut self) -> SessionSummary {
        self.started = Instant::now();
        let music_worker = tokio::spawn(drive_music(
            self.collaborators.music.clone(),
            self.music_tx.subscribe(),
        ));

        let effects = self.controller.start(SessionTime::ZERO);
        self.apply(effects);
        self.publish();

        let mut ticker = tokio::time::interval_at(self.started + TICK, TICK);

        loop {
            tokio::select! {
                biased;

                _ = ticker.tick() => {
                    let now = self.now();
                    let effects = self.controller.tick(now);
                    self.apply(effects);
                }

                fired = self.timers.fired() => {
                    self.on_timer(fired);
                }

                event = self.events_rx.recv() => match event {
                    Some(OrbEvent::Shutdown) | None => {
                        info!("OrbLoop: shutdown requested");
                        break;
                    }
                    Some(event) => self.on_event(event),
                },
            }

            self.reap();
            self.publish();
        }

        self.finish(music_worker).await
    }

    fn on_timer(&mut self, fired: TimerFired) {
        if !self.timers.settle(fired) {
            return;
        }
        let now = self.now();
        match fired.timer {
            TimerKind::WildExpiry => {
                if self.controller.wild_expired(now) {
                    debug!("Wild mode ended");
                }
            }
            TimerKind::Inactivity => {
                let effects = self.controller.inactivity_deadline(now);
                self.apply(effects);
            }
            TimerKind::OrbGlow => {
                self.controller.orb_glow_expired(now);
            }
            TimerKind::InactivityOverlay => {
                self.controller.dismiss_inactivity_message();
            }
            TimerKind::AscensionOverlay => {
                self.controller.dismiss_ascension_message();
            }
        }
    }

    fn on_event(&mut self, event: OrbEvent) {
        let now = self.now();
        let effects = match event {
            OrbEvent::Activity => self.controller.activity(now),
            OrbEvent::ClickOrb => self.controller.click_orb(now),
            OrbEvent::ToggleVoice => self.controller.toggle_voice(now),
            OrbEvent::ToggleMusic => self.controller.toggle_music(now),
            OrbEvent::DismissInactivityMessage => {
                self.controller.dismiss_inactivity_message();
                Vec::new()
            }
            OrbEvent::DismissAscensionMessage => {
                self.controller.dismiss_ascension_message();
                Vec::new()
            }
            OrbEvent::Narration(NarrationEvent::MessageResolved(text)) => {
                self.controller.message_resolved(text);
                Vec::new()
            }
            OrbEvent::Narration(NarrationEvent::Track(event)) => vec![Effect::Track(event)],
            OrbEvent::NarrationFinished(report) => {
                debug!(outcome = ?report.outcome, "Narration finished");
                self.controller.narration_finished(now)
            }
            OrbEvent::Shutdown => Vec::new(),
        };
        self.apply(effects);
    }

    /// Execute effects in order. Each one is infallible here, so a problem in
    /// one collaborator never stops the rest.
    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule { timer, delay } => {
                    self.timers.schedule(timer, delay);
                }
                Effect::Cancel(timer) => {
                    self.timers.cancel(timer);
                }
                Effect::Track(event) => self.track(event),
                Effect::Narrate(ticket) => self.spawn_narration(ticket),
                Effect::Music(command) => {
                    self.music_tx
                        .send_replace(command == MusicCommand::Resume);
                }
            }
        }
    }

    fn track(&mut self, event: AnalyticsEvent) {
        let sink = self.collaborators.analytics.clone();
        self.tasks.spawn(async move {
            let name = event.name;
            if let Err(e) = sink.record(event).await {
                warn!("Failed to record {}: {}", name, e);
            }
        });
    }

    fn spawn_narration(&mut self, ticket: SpeechTicket) {
        let narrator = self.narrator.clone();
        let tx = self.events_tx.clone();
        let cancel = self.cancel.child_token();

        self.tasks.spawn(async move {
            let progress = tx.clone();
            let emit = move |event: NarrationEvent| {
                let _ = progress.send(OrbEvent::Narration(event));
            };
            let report = tokio::select! {
                _ = cancel.cancelled() => NarrationReport::cancelled(),
                report = narrator.narrate(ticket, emit) => report,
            };
            let _ = tx.send(OrbEvent::NarrationFinished(report));
        });
    }

    fn reap(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                if e.is_panic() {
                    warn!("Orb task panicked: {}", e);
                }
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.controller.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    async fn finish(mut self, music_worker: JoinHandle<()>) -> SessionSummary {
        let now = self.now();
        let (summary, effects) = self.controller.end(now);
        self.cancel.cancel();
        self.apply(effects);
        self.timers.cancel_all();
        self.publish();

        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while self.tasks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!("{} orb tasks still running at shutdown, aborting", self.tasks.len());
            self.tasks.abort_all();
        }

        drop(self.music_tx);
        if tokio::time::timeout(SHUTDOWN_GRACE, music_worker).await.is_err() {
            warn!("Music worker did not stop in time");
        }

        info!(
            staring = summary.staring_duration,
            ascended = summary.ultimate_achieved,
            "OrbLoop stopped"
        );
        summary
    }
}
