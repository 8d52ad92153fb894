//! Core types and orchestration for pvm.
//!
//! This crate provides the shared error taxonomy, version resolution, and
//! the command execution seam used by every pipeline stage.

pub mod command;
pub mod env;
pub mod error;
pub mod version;

pub use command::{CommandOutput, CommandRunner, Invocation, ProcessRunner};
pub use env::EnvVars;
pub use error::{Error, ErrorCode, Fix, Result};
pub use version::{Version, archive_name, cache_dest, install_dir};

/// Exit codes for the pvm CLI. Usage errors exit with 2 from clap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Configuration error
    ConfigError = 3,
    /// Fetch, extract, or build failure
    ToolchainError = 4,
    /// Version is not installed
    NotInstalled = 5,
}

impl ExitCode {
    /// Map an error to the exit code the CLI reports for it.
    pub fn for_error(error: &Error) -> Self {
        match error.code() {
            ErrorCode::ConfigLoad | ErrorCode::ConfigError => Self::ConfigError,
            ErrorCode::ManifestFetch
            | ErrorCode::DistributionFetch
            | ErrorCode::ChecksumMismatch
            | ErrorCode::CommandFailed
            | ErrorCode::ToolMissing => Self::ToolchainError,
            ErrorCode::DistributionNotFound => Self::NotInstalled,
            ErrorCode::IoError => Self::GeneralError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
