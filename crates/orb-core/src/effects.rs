//! Background effect magnitudes derived from a snapshot

use crate::types::OrbSnapshot;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundEffects {
    pub star_count: u32,
    pub gradient_intensity: f64,
    /// Seconds per pulse, shorter is faster.
    pub pulse_speed: f64,
    pub glow_intensity: f64,
}

impl BackgroundEffects {
    pub fn from_snapshot(snapshot: &OrbSnapshot) -> Self {
        let intensity = snapshot.intensity.get() as f64;
        let wild = if snapshot.wild_mode { 3.0 } else { 1.0 };
        let ultimate = if snapshot.is_ascended() { 2.0 } else { 1.0 };
        let boost = wild * ultimate;

        Self {
            star_count: (50.0 * intensity * boost).floor() as u32,
            gradient_intensity: (intensity * 0.4 * boost).min(1.0),
            pulse_speed: (2.0 - intensity * 0.4).max(0.2),
            glow_intensity: intensity * 0.3 * boost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AscensionState, IntensityLevel};

    #[test]
    fn calm_first_level() {
        let snap = OrbSnapshot::default();
        let fx = BackgroundEffects::from_snapshot(&snap);
        assert_eq!(fx.star_count, 50);
        assert!((fx.gradient_intensity - 0.4).abs() < 1e-9);
        assert!((fx.pulse_speed - 1.6).abs() < 1e-9);
    }

    #[test]
    fn wild_and_ascended_multiply() {
        let snap = OrbSnapshot {
            intensity: IntensityLevel::MAX,
            wild_mode: true,
            ascension: AscensionState::Ascended,
            ..Default::default()
        };
        let fx = BackgroundEffects::from_snapshot(&snap);
        assert_eq!(fx.star_count, 3000);
        assert_eq!(fx.gradient_intensity, 1.0);
        assert_eq!(fx.pulse_speed, 0.2);
        assert!((fx.glow_intensity - 18.0).abs() < 1e-9);
    }
}
