//! Error types for pvm.

use std::path::PathBuf;

/// Result type alias using pvm Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes for categorizing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Config file exists but could not be read
    ConfigLoad,
    /// Invalid configuration
    ConfigError,
    /// Release manifest unavailable from cache and remote
    ManifestFetch,
    /// Distribution archive could not be downloaded
    DistributionFetch,
    /// Archive does not match the published checksum
    ChecksumMismatch,
    /// External tool exited non-zero
    CommandFailed,
    /// External tool not found
    ToolMissing,
    /// Version has no install directory
    DistributionNotFound,
    /// I/O error
    IoError,
}

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct Fix {
    /// Description of what this fix does
    pub description: String,
    /// Command to run, if applicable
    pub command: Option<String>,
}

impl Fix {
    /// Create a fix with just a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: None,
        }
    }

    /// Create a fix with a command.
    pub fn with_command(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: Some(command.into()),
        }
    }
}

/// Structured error type for pvm.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config file {}", path.display())]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        fixes: Vec<Fix>,
    },

    #[error("release manifest unavailable: {message}")]
    ManifestFetch {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("failed to download {url}: {message}")]
    DistributionFetch {
        url: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        fixes: Vec<Fix>,
    },

    #[error("checksum mismatch for {}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        found: String,
        fixes: Vec<Fix>,
    },

    #[error("command failed: {command}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        fixes: Vec<Fix>,
    },

    #[error("tool not found: {tool}")]
    ToolMissing {
        tool: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        fixes: Vec<Fix>,
    },

    #[error("PHP {version} distribution not found")]
    DistributionNotFound {
        version: String,
        path: PathBuf,
        fixes: Vec<Fix>,
    },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigLoad { .. } => ErrorCode::ConfigLoad,
            Error::Config { .. } => ErrorCode::ConfigError,
            Error::ManifestFetch { .. } => ErrorCode::ManifestFetch,
            Error::DistributionFetch { .. } => ErrorCode::DistributionFetch,
            Error::ChecksumMismatch { .. } => ErrorCode::ChecksumMismatch,
            Error::CommandFailed { .. } => ErrorCode::CommandFailed,
            Error::ToolMissing { .. } => ErrorCode::ToolMissing,
            Error::DistributionNotFound { .. } => ErrorCode::DistributionNotFound,
            Error::Io { .. } => ErrorCode::IoError,
        }
    }

    /// Get suggested fixes for this error.
    pub fn fixes(&self) -> &[Fix] {
        match self {
            Error::Config { fixes, .. } => fixes,
            Error::DistributionFetch { fixes, .. } => fixes,
            Error::ChecksumMismatch { fixes, .. } => fixes,
            Error::CommandFailed { fixes, .. } => fixes,
            Error::ToolMissing { fixes, .. } => fixes,
            Error::DistributionNotFound { fixes, .. } => fixes,
            Error::ConfigLoad { .. } | Error::ManifestFetch { .. } | Error::Io { .. } => &[],
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            path: None,
            source: None,
            fixes: vec![],
        }
    }

    /// Create a config error with a path.
    pub fn config_at(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::Config {
            message: message.into(),
            path: Some(path.into()),
            source: None,
            fixes: vec![],
        }
    }

    /// Create an I/O error tied to a path.
    pub fn io(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::Io {
            message: message.into(),
            path: Some(path.into()),
            source,
        }
    }

    /// Attach a fix to errors that carry fix suggestions.
    pub fn with_fix(mut self, fix: Fix) -> Self {
        match &mut self {
            Error::Config { fixes, .. }
            | Error::DistributionFetch { fixes, .. }
            | Error::ChecksumMismatch { fixes, .. }
            | Error::CommandFailed { fixes, .. }
            | Error::ToolMissing { fixes, .. }
            | Error::DistributionNotFound { fixes, .. } => fixes.push(fix),
            Error::ConfigLoad { .. } | Error::ManifestFetch { .. } | Error::Io { .. } => {}
        }
        self
    }
}
