//! Output formatting for the pvm CLI.

use crate::spinner::Spinner;
use crate::style::Style;
use pvm_core::error::{Error, Fix};
use std::io::{self, Write};

/// Verbosity level for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Verbose output - external tool output is streamed
    Verbose,
}

impl Verbosity {
    /// Derive verbosity from the global flags.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

/// Output handler for consistent CLI output.
///
/// Status and diagnostics go to stderr; listings go to stdout.
#[derive(Debug, Clone)]
pub struct Output {
    verbosity: Verbosity,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output handler with default verbosity.
    pub fn new() -> Self {
        Self {
            verbosity: Verbosity::Normal,
        }
    }

    /// Create an output handler with specified verbosity.
    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Get the current verbosity level.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Check if verbose output is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbosity >= Verbosity::Verbose
    }

    /// Start a spinner, hidden unless output is at normal verbosity.
    ///
    /// In verbose mode tool output is streamed to the terminal, which a
    /// spinner would garble.
    pub fn spinner(&self, message: impl Into<String>) -> Spinner {
        match self.verbosity {
            Verbosity::Normal => Spinner::new(message),
            Verbosity::Quiet | Verbosity::Verbose => Spinner::hidden(message),
        }
    }

    /// Print a status message with a step title.
    pub fn status(&self, action: &str, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{:>12} {}", Style::bold(Style::success(action)), message);
        }
    }

    /// Print an info message.
    pub fn info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", message);
        }
    }

    /// Print a warning message.
    pub fn warn(&self, message: &str) {
        eprintln!("{}: {}", Style::warning("warning"), message);
    }

    /// Print verbose output (only shown in verbose mode).
    pub fn verbose(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{}", Style::dim(message));
        }
    }

    /// Print a line of data to stdout regardless of verbosity.
    pub fn print(&self, line: &str) {
        println!("{}", line);
    }

    /// Print a structured error with fixes.
    pub fn print_error(&self, error: &Error) {
        eprintln!();
        eprintln!("{}: {}", Style::error("error"), error);

        match error {
            Error::ConfigLoad { source, .. } => {
                eprintln!("  {} {}", Style::dim("cause:"), source);
            }
            Error::Config { path: Some(p), .. }
            | Error::Io { path: Some(p), .. }
            | Error::DistributionNotFound { path: p, .. } => {
                eprintln!("  {} {}", Style::dim("-->"), p.display());
            }
            Error::ChecksumMismatch {
                expected, found, ..
            } => {
                eprintln!("  {} {}", Style::dim("expected:"), expected);
                eprintln!("  {} {}", Style::dim("found:"), found);
            }
            Error::CommandFailed {
                exit_code, stderr, ..
            } => {
                if let Some(code) = exit_code {
                    eprintln!("  {} {}", Style::dim("exit code:"), code);
                }
                let tail: Vec<&str> = stderr.lines().rev().take(10).collect();
                for line in tail.into_iter().rev() {
                    eprintln!("  {} {}", Style::dim("|"), line);
                }
            }
            Error::ManifestFetch {
                source: Some(s), ..
            }
            | Error::DistributionFetch {
                source: Some(s), ..
            } => {
                eprintln!("  {} {}", Style::dim("cause:"), s);
            }
            _ => {}
        }

        let fixes = error.fixes();
        if !fixes.is_empty() {
            eprintln!();
            for fix in fixes {
                self.print_fix(fix);
            }
        }
    }

    /// Print a fix suggestion.
    pub fn print_fix(&self, fix: &Fix) {
        if let Some(ref cmd) = fix.command {
            eprintln!("{}: Run `{}`", Style::info("fix"), Style::command(cmd));
            if fix.description != *cmd {
                eprintln!("      {}", Style::dim(&fix.description));
            }
        } else {
            eprintln!("{}: {}", Style::info("fix"), fix.description);
        }
    }

    /// Print a list item.
    pub fn list_item(&self, key: &str, value: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("  {}: {}", Style::dim(key), value);
        }
    }

    /// Print a success summary with duration.
    pub fn success_summary(&self, action: &str, duration: std::time::Duration) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!(
                "{} {} {}",
                Style::success("✓"),
                action,
                Style::dim(format!("({})", Style::duration(duration)))
            );
        }
    }

    /// Flush stdout.
    pub fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn test_is_verbose() {
        assert!(Output::with_verbosity(Verbosity::Verbose).is_verbose());
        assert!(!Output::new().is_verbose());
    }
}
