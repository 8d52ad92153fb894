//! Command execution utilities.
//!
//! Pipeline stages never spawn processes directly. They describe what to run
//! as an [`Invocation`] and hand it to a [`CommandRunner`], which lets tests
//! substitute a recording fake for [`ProcessRunner`].

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{Error, Fix};

/// A program to run, with its arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Working directory for the process
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    /// Create an invocation with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ToolMissing {
                tool: self.program.clone(),
                source: Some(Box::new(e)),
                fixes: vec![Fix::new(format!(
                    "Install `{}` and make sure it is on PATH",
                    self.program
                ))],
            }
        } else {
            Error::Io {
                message: format!("failed to execute {}", self.program),
                path: self.working_dir.clone(),
                source: e,
            }
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Output from a command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code (0 = success, -1 if terminated by a signal)
    pub exit_code: i32,
    /// Standard output (empty when streamed to the terminal)
    pub stdout: String,
    /// Standard error (empty when streamed to the terminal)
    pub stderr: String,
    /// How long the command took
    pub duration: Duration,
}

impl CommandOutput {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Convert a non-zero exit into [`Error::CommandFailed`].
    pub fn into_checked(self, invocation: &Invocation) -> Result<Self, Error> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::CommandFailed {
                command: invocation.to_string(),
                exit_code: Some(self.exit_code),
                stdout: self.stdout,
                stderr: self.stderr,
                fixes: vec![],
            })
        }
    }
}

/// Executes external programs on behalf of pipeline stages.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run with the parent's stdio attached, so output goes straight to the terminal.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, Error>;

    /// Run with stdout and stderr captured.
    async fn capture(&self, invocation: &Invocation) -> Result<CommandOutput, Error>;

    /// Run (streamed or captured) and fail on a non-zero exit.
    async fn run_checked(
        &self,
        invocation: &Invocation,
        stream: bool,
    ) -> Result<CommandOutput, Error> {
        let output = if stream {
            self.run(invocation).await?
        } else {
            self.capture(invocation).await?
        };
        output.into_checked(invocation)
    }
}

/// A [`CommandRunner`] that spawns real processes with tokio.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    #[instrument(skip(self, invocation), fields(program = %invocation.program))]
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, Error> {
        debug!("Running command: {}", invocation);

        let mut cmd = invocation.command();
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let start = Instant::now();
        let status = cmd
            .status()
            .await
            .map_err(|e| invocation.spawn_error(e))?;
        let duration = start.elapsed();
        let exit_code = status.code().unwrap_or(-1);

        debug!(
            exit_code = exit_code,
            duration_ms = duration.as_millis(),
            "Command completed"
        );

        Ok(CommandOutput {
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
            duration,
        })
    }

    #[instrument(skip(self, invocation), fields(program = %invocation.program))]
    async fn capture(&self, invocation: &Invocation) -> Result<CommandOutput, Error> {
        debug!("Running command: {}", invocation);

        let mut cmd = invocation.command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = Instant::now();
        let output = cmd
            .output()
            .await
            .map_err(|e| invocation.spawn_error(e))?;
        let duration = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(
            exit_code = exit_code,
            duration_ms = duration.as_millis(),
            "Command completed"
        );

        Ok(CommandOutput {
            exit_code,
            stdout,
            stderr,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new("tar").args(["-xzf", "php-8.4.0.tar.gz", "-C", "/opt"]);
        assert_eq!(inv.to_string(), "tar -xzf php-8.4.0.tar.gz -C /opt");
    }

    #[test]
    fn test_into_checked_failure() {
        let inv = Invocation::new("make").arg("-j4");
        let output = CommandOutput {
            exit_code: 2,
            stdout: String::new(),
            stderr: "error".into(),
            duration: Duration::ZERO,
        };

        let err = output.into_checked(&inv).unwrap_err();
        match err {
            Error::CommandFailed {
                command, exit_code, ..
            } => {
                assert_eq!(command, "make -j4");
                assert_eq!(exit_code, Some(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_output() {
        let runner = ProcessRunner::new();
        let output = runner
            .capture(&Invocation::new("sh").args(["-c", "echo hello; exit 3"]))
            .await
            .unwrap();

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout.trim(), "hello");
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();

        let runner = ProcessRunner::new();
        let output = runner
            .run_checked(
                &Invocation::new("ls").with_working_dir(dir.path()),
                false,
            )
            .await
            .unwrap();
        assert!(output.stdout.contains("marker"));
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let runner = ProcessRunner::new();
        let err = runner
            .capture(&Invocation::new("pvm-definitely-not-a-real-tool"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ToolMissing);
    }
}
