//! Terminal presentation: a status line rendered from snapshots, and stdin
//! commands forwarded to the orb

use orb_core::narration::{format_staring_time, inactivity_script};
use orb_core::{BackgroundEffects, OrbSnapshot};
use orb_engine::OrbHandle;

pub const HELP: &str = "enter = stare harder (activity)  c = click orb  v = voice  m = music  d = dismiss  q = quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Activity,
    Click,
    ToggleVoice,
    ToggleMusic,
    Dismiss,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Unknown input is still treated as activity.
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "c" | "click" => ConsoleCommand::Click,
            "v" | "voice" => ConsoleCommand::ToggleVoice,
            "m" | "music" => ConsoleCommand::ToggleMusic,
            "d" | "dismiss" => ConsoleCommand::Dismiss,
            "h" | "?" | "help" => ConsoleCommand::Help,
            "q" | "quit" | "exit" => ConsoleCommand::Quit,
            _ => ConsoleCommand::Activity,
        }
    }

    /// Forward to the orb. Every keypress is also presence input.
    pub fn dispatch(self, handle: &OrbHandle) -> orb_core::Result<()> {
        match self {
            ConsoleCommand::Quit => return handle.shutdown(),
            ConsoleCommand::Help => return Ok(()),
            _ => handle.activity()?,
        }
        match self {
            ConsoleCommand::Click => handle.click_orb(),
            ConsoleCommand::ToggleVoice => handle.toggle_voice(),
            ConsoleCommand::ToggleMusic => handle.toggle_music(),
            ConsoleCommand::Dismiss => {
                let snapshot = handle.snapshot();
                if snapshot.ascension_message {
                    handle.dismiss_ascension_message()
                } else {
                    handle.dismiss_inactivity_message()
                }
            }
            _ => Ok(()),
        }
    }
}

/// One-line summary of the orb.
pub fn status_line(snapshot: &OrbSnapshot) -> String {
    let fx = BackgroundEffects::from_snapshot(snapshot);
    let mut line = format!(
        "[{}] {}  level {}/10  stars {}  glow {:.1}  pulse {:.1}s",
        snapshot.title(),
        snapshot.clock_display(),
        snapshot.intensity,
        fx.star_count,
        fx.glow_intensity,
        fx.pulse_speed,
    );
    if snapshot.wild_mode {
        line.push_str("  ~WILD~");
    }
    if snapshot.orb_active {
        line.push_str("  (orb speaking)");
    }
    line.push_str(if snapshot.voice_muted { "  voice off" } else { "  voice on" });
    line.push_str(if snapshot.music_muted { "  music off" } else { "  music on" });
    if snapshot.speech_used() {
        line.push_str("  oracle spent");
    }
    line
}

/// Turns successive snapshots into lines to print.
#[derive(Debug, Default)]
pub struct Console {
    last: Option<OrbSnapshot>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announcements for anything that appeared since the previous snapshot,
    /// followed by the status line when it changed.
    pub fn render(&mut self, snapshot: &OrbSnapshot) -> Vec<String> {
        let mut lines = Vec::new();
        let first = self.last.is_none();
        let prev = self.last.take().unwrap_or_default();

        if snapshot.oracle_message != prev.oracle_message {
            if let Some(text) = &snapshot.oracle_message {
                lines.push(format!("  * {}", text));
            }
        }
        if snapshot.inactivity_message && !prev.inactivity_message {
            let staring = snapshot.milestone_secs.unwrap_or(snapshot.elapsed_secs);
            lines.push(format!("  >> {} (d to dismiss)", inactivity_script(staring)));
        }
        if snapshot.ascension_message && !prev.ascension_message {
            let staring = snapshot.ascended_secs.unwrap_or(snapshot.elapsed_secs);
            lines.push(format!(
                "  >> {} in {}. (d to dismiss)",
                snapshot.title(),
                format_staring_time(staring)
            ));
        }

        let status = status_line(snapshot);
        if first || status != status_line(&prev) {
            lines.push(status);
        }
        self.last = Some(snapshot.clone());
        lines
    }
}
