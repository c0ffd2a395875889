//! Terminal output for the CLI binary.
//!
//! All messages go to stderr so that the translated HTML on stdout stays
//! pipeable. Colors are dropped when stderr is not a TTY or `NO_COLOR`
//! is set.

use std::io::IsTerminal;

const RED: &str = "31";
const GREEN: &str = "32";
const YELLOW: &str = "33";
const CYAN: &str = "36";

/// Console output handler with color support detection.
#[derive(Debug)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates a new Console, detecting color support on stderr.
    pub fn new() -> Self {
        let colors_enabled =
            std::env::var("NO_COLOR").is_err() && std::io::stderr().is_terminal();
        Self { colors_enabled }
    }

    /// Creates a Console with colors explicitly enabled or disabled.
    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    fn label(&self, text: &str, color: &str) -> String {
        if self.colors_enabled {
            format!("[\x1b[1;{color}m{text}\x1b[0m]")
        } else {
            format!("[{text}]")
        }
    }

    /// Prints a progress step with a cyan `[STEP]` label.
    pub fn step(&self, message: &str) {
        eprintln!("{} {}", self.label("STEP", CYAN), message);
    }

    /// Prints a success message with a green `[OK]` label.
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", self.label("OK", GREEN), message);
    }

    /// Prints a warning with a yellow `[WARN]` label.
    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", self.label("WARN", YELLOW), message);
    }

    /// Prints an error with a red `[ERROR]` label.
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.label("ERROR", RED), message);
    }
}
