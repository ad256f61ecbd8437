//! Engagement clock: counts staring seconds and decides when wild bursts start

use orb_core::{wild_duration, wild_interval_secs, IntensityLevel, SessionTime};
use std::time::Duration;

/// Result of advancing the clock by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub elapsed_secs: u64,
    pub level: IntensityLevel,
}

#[derive(Debug, Default)]
struct WildMode {
    active: bool,
    until: Option<SessionTime>,
    /// Held on permanently after ascension.
    pinned: bool,
}

#[derive(Debug, Default)]
pub struct EngagementClock {
    elapsed_secs: u64,
    wild: WildMode,
}

impl EngagementClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn level(&self) -> IntensityLevel {
        IntensityLevel::for_elapsed(self.elapsed_secs)
    }

    pub fn wild_active(&self) -> bool {
        self.wild.active
    }

    pub fn wild_until(&self) -> Option<SessionTime> {
        self.wild.until
    }

    pub fn advance(&mut self) -> Tick {
        self.elapsed_secs += 1;
        Tick {
            elapsed_secs: self.elapsed_secs,
            level: self.level(),
        }
    }

    /// Burst length if the current second lands on the wild interval.
    ///
    /// The interval is re-derived from the current elapsed value every tick,
    /// so a burst fires exactly when `elapsed % interval(elapsed) == 0`.
    pub fn wild_burst_due(&self) -> Option<Duration> {
        if self.wild.pinned {
            return None;
        }
        let elapsed = self.elapsed_secs;
        if elapsed > 0 && elapsed % wild_interval_secs(elapsed) == 0 {
            Some(wild_duration(elapsed))
        } else {
            None
        }
    }

    /// Start (or extend) a burst. A new burst replaces the previous deadline.
    pub fn start_wild(&mut self, now: SessionTime, duration: Duration) -> SessionTime {
        let until = now.after(duration);
        self.wild.active = true;
        self.wild.until = Some(until);
        until
    }

    /// Returns true when the burst actually ended.
    pub fn expire_wild(&mut self, now: SessionTime) -> bool {
        if self.wild.pinned {
            return false;
        }
        match self.wild.until {
            Some(until) if now >= until => {
                self.wild.active = false;
                self.wild.until = None;
                true
            }
            _ => false,
        }
    }

    pub fn pin_wild(&mut self) {
        self.wild.pinned = true;
        self.wild.active = true;
        self.wild.until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to(clock: &mut EngagementClock, secs: u64) -> Vec<u64> {
        let mut bursts = Vec::new();
        while clock.elapsed_secs() < secs {
            let tick = clock.advance();
            if clock.wild_burst_due().is_some() {
                bursts.push(tick.elapsed_secs);
            }
        }
        bursts
    }

    #[test]
    fn advance_counts_seconds() {
        let mut clock = EngagementClock::new();
        assert_eq!(clock.level().get(), 1);
        let tick = clock.advance();
        assert_eq!(tick.elapsed_secs, 1);
        assert_eq!(clock.elapsed_secs(), 1);
    }

    #[test]
    fn burst_schedule_before_ascension() {
        let mut clock = EngagementClock::new();
        let bursts = run_to(&mut clock, 134);
        assert_eq!(bursts, vec![23, 42, 57, 68, 75, 91, 104, 110, 126]);
    }

    #[test]
    fn no_burst_off_interval() {
        let mut clock = EngagementClock::new();
        run_to(&mut clock, 40);
        assert!(clock.wild_burst_due().is_none());
        clock.advance();
        clock.advance();
        assert_eq!(clock.elapsed_secs(), 42);
        assert_eq!(clock.wild_burst_due(), Some(Duration::from_millis(3_400)));
    }

    #[test]
    fn burst_expires_only_after_deadline() {
        let mut clock = EngagementClock::new();
        let until = clock.start_wild(SessionTime::from_secs(23), Duration::from_millis(2_766));
        assert_eq!(until.as_millis(), 25_766);
        assert!(!clock.expire_wild(SessionTime::from_millis(25_000)));
        assert!(clock.wild_active());
        assert!(clock.expire_wild(until));
        assert!(!clock.wild_active());
    }

    #[test]
    fn pinned_wild_never_expires_or_bursts() {
        let mut clock = EngagementClock::new();
        clock.start_wild(SessionTime::ZERO, Duration::from_secs(2));
        clock.pin_wild();
        assert!(!clock.expire_wild(SessionTime::from_secs(60)));
        assert!(clock.wild_active());
        let bursts = run_to(&mut clock, 300);
        assert!(bursts.is_empty());
    }
}
