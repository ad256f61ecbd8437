//! Ascension: the one-way Dormant -> Ascended transition

use orb_core::{AscensionState, IntensityLevel, SessionTime};

#[derive(Debug, Default)]
pub struct Ascension {
    state: AscensionState,
    ascended_at: Option<SessionTime>,
}

impl Ascension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AscensionState {
        self.state
    }

    pub fn is_ascended(&self) -> bool {
        self.state == AscensionState::Ascended
    }

    pub fn ascended_at(&self) -> Option<SessionTime> {
        self.ascended_at
    }

    /// Whether a tick at `level` should trigger the transition.
    pub fn should_ascend(&self, level: IntensityLevel) -> bool {
        !self.is_ascended() && level.is_max()
    }

    /// Flip to Ascended. True only for the call that performs the transition.
    pub fn ascend(&mut self, now: SessionTime) -> bool {
        if self.is_ascended() {
            return false;
        }
        self.state = AscensionState::Ascended;
        self.ascended_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_way_transition() {
        let mut a = Ascension::new();
        assert!(!a.should_ascend(IntensityLevel::for_elapsed(134)));
        assert!(a.should_ascend(IntensityLevel::for_elapsed(135)));
        assert!(a.ascend(SessionTime::from_secs(135)));
        assert!(!a.ascend(SessionTime::from_secs(136)));
        assert_eq!(a.ascended_at(), Some(SessionTime::from_secs(135)));
        assert!(!a.should_ascend(IntensityLevel::MAX));
    }
}
