//! Named one-shot timers with replace-on-reschedule semantics
//!
//! Each [`TimerKind`] has at most one pending instance. Scheduling aborts the
//! previous instance before arming the new one, and every instance carries a
//! generation so a firing that raced with a cancel is recognised as stale.

use crate::controller::TimerKind;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub timer: TimerKind,
    pub generation: u64,
}

struct Slot {
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct TimerSet {
    tx: mpsc::UnboundedSender<TimerFired>,
    rx: mpsc::UnboundedReceiver<TimerFired>,
    slots: HashMap<TimerKind, Slot>,
    next_generation: u64,
}

impl Default for TimerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerSet {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            slots: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn is_pending(&self, timer: TimerKind) -> bool {
        self.slots.contains_key(&timer)
    }

    pub fn pending(&self) -> usize {
        self.slots.len()
    }

    /// Arm `timer` to fire after `delay`, replacing any pending instance.
    pub fn schedule(&mut self, timer: TimerKind, delay: Duration) -> u64 {
        self.cancel(timer);
        self.next_generation += 1;
        let generation = self.next_generation;

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(TimerFired { timer, generation });
        });
        debug!(?timer, generation, "Timer armed for {}ms", delay.as_millis());
        self.slots.insert(timer, Slot { generation, handle });
        generation
    }

    /// Returns true if an instance was pending.
    pub fn cancel(&mut self, timer: TimerKind) -> bool {
        match self.slots.remove(&timer) {
            Some(slot) => {
                slot.handle.abort();
                debug!(?timer, generation = slot.generation, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, slot) in self.slots.drain() {
            slot.handle.abort();
        }
    }

    /// Next firing, in firing order. Pending forever while nothing is armed.
    pub async fn fired(&mut self) -> TimerFired {
        match self.rx.recv().await {
            Some(fired) => fired,
            // the set owns a sender, so the channel never closes
            None => std::future::pending().await,
        }
    }

    /// Accept a firing if it belongs to the live instance of its timer.
    /// Stale firings from cancelled or replaced instances return false.
    pub fn settle(&mut self, fired: TimerFired) -> bool {
        match self.slots.get(&fired.timer) {
            Some(slot) if slot.generation == fired.generation => {
                self.slots.remove(&fired.timer);
                true
            }
            _ => {
                debug!(timer = ?fired.timer, generation = fired.generation, "Stale timer ignored");
                false
            }
        }
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let mut timers = TimerSet::new();
        timers.schedule(TimerKind::Inactivity, Duration::from_secs(66));
        let start = tokio::time::Instant::now();
        let fired = timers.fired().await;
        assert_eq!(start.elapsed(), Duration::from_secs(66));
        assert!(timers.settle(fired));
        assert!(!timers.is_pending(TimerKind::Inactivity));
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_replaces_previous() {
        let mut timers = TimerSet::new();
        let first = timers.schedule(TimerKind::WildExpiry, Duration::from_secs(2));
        let second = timers.schedule(TimerKind::WildExpiry, Duration::from_secs(5));
        assert_ne!(first, second);
        assert_eq!(timers.pending(), 1);

        let start = tokio::time::Instant::now();
        let fired = timers.fired().await;
        assert_eq!(fired.generation, second);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_firing_is_stale() {
        let mut timers = TimerSet::new();
        let generation = timers.schedule(TimerKind::OrbGlow, Duration::from_secs(1));
        assert!(timers.cancel(TimerKind::OrbGlow));
        assert!(!timers.cancel(TimerKind::OrbGlow));
        // a firing that was already queued when the cancel landed
        assert!(!timers.settle(TimerFired {
            timer: TimerKind::OrbGlow,
            generation,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn kinds_are_independent() {
        let mut timers = TimerSet::new();
        timers.schedule(TimerKind::WildExpiry, Duration::from_secs(3));
        timers.schedule(TimerKind::OrbGlow, Duration::from_secs(1));
        let first = timers.fired().await;
        assert_eq!(first.timer, TimerKind::OrbGlow);
        assert!(timers.settle(first));
        assert!(timers.is_pending(TimerKind::WildExpiry));
    }
}
