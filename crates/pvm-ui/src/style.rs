//! Styling utilities for terminal output.

use console::{StyledObject, style};

/// Style helper for consistent terminal output.
pub struct Style;

impl Style {
    /// Style text as an error (red).
    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red().bold()
    }

    /// Style text as a warning (yellow).
    pub fn warning<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).yellow()
    }

    /// Style text as success (green).
    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    /// Style text as info (cyan).
    pub fn info<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan()
    }

    /// Style a command hint (cyan, bold).
    pub fn command<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan().bold()
    }

    /// Style a PHP version number.
    pub fn version<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).magenta().bold()
    }

    /// Style text as dim (for secondary info).
    pub fn dim<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }

    /// Style text as bold.
    pub fn bold<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).bold()
    }

    /// Format a duration for humans. Builds can take many minutes.
    pub fn duration(duration: std::time::Duration) -> String {
        let secs = duration.as_secs_f64();
        if secs < 1.0 {
            format!("{:.0}ms", duration.as_millis())
        } else if secs < 60.0 {
            format!("{:.1}s", secs)
        } else {
            let total = duration.as_secs();
            format!("{}m {:02}s", total / 60, total % 60)
        }
    }

    /// Format a byte count in megabytes.
    pub fn megabytes(bytes: u64) -> String {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    }
}

/// Per-stream color decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorChoice {
    pub stdout: bool,
    pub stderr: bool,
}

impl ColorChoice {
    /// Color a stream only when it is a terminal and nothing disables color.
    pub fn decide(disabled: bool, stdout_is_term: bool, stderr_is_term: bool) -> Self {
        Self {
            stdout: !disabled && stdout_is_term,
            stderr: !disabled && stderr_is_term,
        }
    }

    /// Decide from `--no-color`, `NO_COLOR` and the real streams.
    pub fn detect(no_color_flag: bool) -> Self {
        Self::decide(
            no_color_flag || pvm_core::env::no_color(),
            console::Term::stdout().is_term(),
            console::Term::stderr().is_term(),
        )
    }
}

/// Apply the color decision to stdout and stderr independently.
pub fn configure_colors(no_color_flag: bool) {
    let choice = ColorChoice::detect(no_color_flag);
    console::set_colors_enabled(choice.stdout);
    console::set_colors_enabled_stderr(choice.stderr);
}
