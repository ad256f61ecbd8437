//! Narration scripts and the local fallback wisdom pool

use rand::Rng;

/// Spoken when a remote message provider is unavailable.
pub const FALLBACK_MESSAGES: [&str; 20] = [
    "The cosmos whispers secrets... also, did you remember to feed your cat?",
    "Stars align when consciousness awakens... and when Mercury isn't in retrograde.",
    "In the void between thoughts, truth crystallizes... or maybe that's just screen glare.",
    "Time bends around those who stare into eternity... but your neck might get sore.",
    "The universe speaks in silence... mostly because it forgot to pay its phone bill.",
    "Between heartbeats, galaxies are born and die... which is frankly quite rude.",
    "Your gaze pierces the veil between dimensions... hopefully not literally.",
    "Ancient wisdom flows through quantum streams... and fiber optic cables.",
    "The orb reflects what your soul knows... that you should probably blink more.",
    "Consciousness expands beyond flesh and bone... but please stay hydrated.",
    "The void stares back, but it's quite friendly once you get to know it.",
    "Enlightenment is just three payments of $19.99... wait, that's not right.",
    "Reality is surprisingly wrinkle-resistant and machine washable.",
    "Your third eye is opening... you might want to get that checked.",
    "The universe is expanding, but so is your browser history.",
    "Cosmic forces align to reveal... you've been staring at a screen.",
    "The eternal dance continues... and it has surprisingly good rhythm.",
    "Reality is an illusion, but the Wi-Fi password is still \"password123\".",
    "The orb contains infinite wisdom... and a good recipe for cosmic brownies.",
    "You are one with the universe... the universe is mildly concerned.",
];

/// Uniform pick from [`FALLBACK_MESSAGES`].
pub fn pick_fallback<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    FALLBACK_MESSAGES[rng.random_range(0..FALLBACK_MESSAGES.len())]
}

pub fn random_fallback() -> &'static str {
    pick_fallback(&mut rand::rng())
}

/// "2 minutes and 15 seconds", "1 minute and 0 seconds", "45 seconds".
pub fn format_staring_time(secs: u64) -> String {
    let mins = secs / 60;
    let rest = secs % 60;
    let plural = |n: u64| if n == 1 { "" } else { "s" };
    if mins > 0 {
        format!(
            "{} minute{} and {} second{}",
            mins,
            plural(mins),
            rest,
            plural(rest)
        )
    } else {
        format!("{} second{}", rest, plural(rest))
    }
}

pub fn inactivity_script(staring_secs: u64) -> String {
    format!(
        "Congratulations! You wasted exactly {} staring at a glowing circle. \
         The orb stares back and judges your life choices.",
        format_staring_time(staring_secs)
    )
}

pub fn ascension_script(staring_secs: u64) -> String {
    format!(
        "Ultimate achievement unlocked! You've officially wasted {} of your life \
         staring at a fancy screensaver. The orb is impressed by your dedication to \
         procrastination. Time well spent? The universe says probably not.",
        format_staring_time(staring_secs)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn staring_time_plurals() {
        assert_eq!(format_staring_time(0), "0 seconds");
        assert_eq!(format_staring_time(1), "1 second");
        assert_eq!(format_staring_time(66), "1 minute and 6 seconds");
        assert_eq!(format_staring_time(135), "2 minutes and 15 seconds");
        assert_eq!(format_staring_time(61), "1 minute and 1 second");
    }

    #[test]
    fn fallback_pick_stays_in_pool() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let msg = pick_fallback(&mut rng);
            assert!(FALLBACK_MESSAGES.contains(&msg));
        }
    }

    #[test]
    fn scripts_mention_staring_time() {
        assert!(inactivity_script(66).contains("1 minute and 6 seconds"));
        assert!(ascension_script(135).starts_with("Ultimate achievement unlocked!"));
    }
}
