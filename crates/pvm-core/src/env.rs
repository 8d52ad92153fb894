//! Environment variable constants for pvm.
//!
//! This module defines all environment variables that pvm recognizes,
//! providing a single source of truth for environment configuration.

/// Environment variable names used by pvm.
pub struct EnvVars;

impl EnvVars {
    // ─── Global Settings ─────────────────────────────────────────────────────

    /// Path to the pvm configuration file.
    pub const PVM_CONFIG_FILE: &'static str = "PVM_CONFIG_FILE";

    /// Enable verbose output.
    pub const PVM_VERBOSE: &'static str = "PVM_VERBOSE";

    /// Suppress output.
    pub const PVM_QUIET: &'static str = "PVM_QUIET";

    /// Enable JSON log output.
    pub const PVM_LOG_JSON: &'static str = "PVM_LOG_JSON";

    // ─── Activation ──────────────────────────────────────────────────────────

    /// Directory holding the global `php` symlink.
    pub const PVM_BINARY_DIR: &'static str = "PVM_BINARY_DIR";

    /// Directory holding the global `php.ini` symlink.
    pub const PVM_INI_DIR: &'static str = "PVM_INI_DIR";

    // ─── Build Settings ──────────────────────────────────────────────────────

    /// Number of parallel make jobs.
    pub const PVM_JOBS: &'static str = "PVM_JOBS";

    /// iconv installation prefix passed to `./configure --with-iconv`.
    pub const ICONV_DIR: &'static str = "ICONV_DIR";

    // ─── Standard Environment Variables ──────────────────────────────────────

    /// Standard NO_COLOR environment variable.
    pub const NO_COLOR: &'static str = "NO_COLOR";

    /// Standard CLICOLOR environment variable.
    pub const CLICOLOR: &'static str = "CLICOLOR";
}

/// Read the iconv prefix for the configure phase, ignoring empty values.
pub fn iconv_dir() -> Option<String> {
    std::env::var(EnvVars::ICONV_DIR)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Check if colors should be disabled based on environment.
pub fn no_color() -> bool {
    std::env::var(EnvVars::NO_COLOR).is_ok()
        || std::env::var(EnvVars::CLICOLOR)
            .map(|v| v == "0")
            .unwrap_or(false)
}
