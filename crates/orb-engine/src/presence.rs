//! Presence monitor: one-shot milestone after a long stretch without input

use orb_core::{MilestoneState, SessionTime};
use std::time::Duration;

pub const DEFAULT_INACTIVITY: Duration = Duration::from_millis(66_000);

#[derive(Debug)]
pub struct PresenceMonitor {
    timeout: Duration,
    deadline: Option<SessionTime>,
    milestone: MilestoneState,
}

impl Default for PresenceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_INACTIVITY)
    }
}

impl PresenceMonitor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
            milestone: MilestoneState::Armed,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn deadline(&self) -> Option<SessionTime> {
        self.deadline
    }

    pub fn milestone(&self) -> MilestoneState {
        self.milestone
    }

    /// Input observed at `now`. Returns the new deadline, or `None` once the
    /// milestone is spent and there is nothing left to wait for.
    pub fn observe(&mut self, now: SessionTime) -> Option<SessionTime> {
        if self.milestone.is_spent() {
            self.deadline = None;
            return None;
        }
        let deadline = now.after(self.timeout);
        self.deadline = Some(deadline);
        Some(deadline)
    }

    /// The deadline timer went off. True exactly once per session.
    pub fn deadline_reached(&mut self, now: SessionTime) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline && !self.milestone.is_spent() => {
                self.milestone = MilestoneState::Fired;
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Disarm for good. Returns true if a deadline was pending.
    pub fn suppress(&mut self) -> bool {
        if self.milestone == MilestoneState::Armed {
            self.milestone = MilestoneState::Suppressed;
        }
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_timeout_once() {
        let mut pm = PresenceMonitor::default();
        assert_eq!(pm.observe(SessionTime::ZERO), Some(SessionTime::from_millis(66_000)));
        assert!(!pm.deadline_reached(SessionTime::from_millis(65_999)));
        assert!(pm.deadline_reached(SessionTime::from_millis(66_000)));
        assert_eq!(pm.milestone(), MilestoneState::Fired);
        assert!(!pm.deadline_reached(SessionTime::from_millis(66_000)));
    }

    #[test]
    fn activity_pushes_deadline() {
        let mut pm = PresenceMonitor::default();
        pm.observe(SessionTime::ZERO);
        pm.observe(SessionTime::from_secs(30));
        assert!(!pm.deadline_reached(SessionTime::from_secs(66)));
        assert!(pm.deadline_reached(SessionTime::from_secs(96)));
    }

    #[test]
    fn spent_monitor_ignores_activity() {
        let mut pm = PresenceMonitor::default();
        pm.observe(SessionTime::ZERO);
        assert!(pm.deadline_reached(SessionTime::from_secs(66)));
        assert_eq!(pm.observe(SessionTime::from_secs(70)), None);
        assert!(!pm.deadline_reached(SessionTime::from_secs(200)));
    }

    #[test]
    fn suppress_cancels_pending_deadline() {
        let mut pm = PresenceMonitor::default();
        pm.observe(SessionTime::from_secs(65));
        assert!(pm.suppress());
        assert_eq!(pm.milestone(), MilestoneState::Suppressed);
        assert!(!pm.deadline_reached(SessionTime::from_secs(131)));
        assert_eq!(pm.observe(SessionTime::from_secs(140)), None);
    }

    #[test]
    fn suppress_keeps_fired_state() {
        let mut pm = PresenceMonitor::default();
        pm.observe(SessionTime::ZERO);
        pm.deadline_reached(SessionTime::from_secs(66));
        assert!(!pm.suppress());
        assert_eq!(pm.milestone(), MilestoneState::Fired);
    }
}
