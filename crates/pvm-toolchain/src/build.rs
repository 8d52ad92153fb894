//! Configure and compile an extracted source tree.
//!
//! Both phases are skipped when their output is already on disk: a
//! `Makefile` means configure has run, `sapi/cli/php` means the interpreter
//! is built.

use pvm_core::{CommandRunner, EnvVars, Error, Fix, Invocation, Result, Version, env};
use pvm_ui::Output;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Flags passed to every `./configure` run.
pub const CONFIGURE_FLAGS: &[&str] = &[
    "--enable-calendar",
    "--enable-bcmath",
    "--enable-exif",
    "--enable-ftp",
    "--enable-mbstring",
    "--enable-soap",
    "--enable-sockets",
    "--enable-shmop",
    "--enable-sysvsem",
    "--enable-sysvshm",
    "--enable-pcntl",
    "--enable-phar",
    "--enable-opcache",
    "--with-curl",
    "--with-openssl",
    "--with-zlib",
    "--with-mysqli",
    "--with-pdo-mysql",
    "--with-pdo-sqlite",
    "--with-zip",
    "--with-jpeg",
    "--with-freetype",
    "--with-gettext",
];

/// Written by `./configure`.
pub const CONFIGURE_MARKER: &str = "Makefile";

/// The built CLI interpreter, relative to the source tree.
pub const PHP_BINARY: &str = "sapi/cli/php";

/// Path of the built interpreter inside `dir`.
pub fn php_binary(dir: &Path) -> PathBuf {
    dir.join(PHP_BINARY)
}

/// Whether a phase ran or was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Ran,
    Skipped,
}

impl PhaseOutcome {
    pub fn ran(self) -> bool {
        self == PhaseOutcome::Ran
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub configured: PhaseOutcome,
    pub compiled: PhaseOutcome,
}

/// Options for a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Parallel make jobs.
    pub jobs: usize,
    /// `--with-iconv` prefix.
    pub iconv_dir: Option<String>,
    /// Send tool output to the terminal instead of capturing it.
    pub stream_output: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            iconv_dir: None,
            stream_output: false,
        }
    }
}

impl BuildOptions {
    /// Defaults, with `ICONV_DIR` picked up from the environment.
    pub fn from_env() -> Self {
        Self {
            iconv_dir: env::iconv_dir(),
            ..Default::default()
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_stream_output(mut self, stream: bool) -> Self {
        self.stream_output = stream;
        self
    }
}

/// `PVM_JOBS` if set to a positive number, else the logical CPU count.
pub fn default_jobs() -> usize {
    std::env::var(EnvVars::PVM_JOBS)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(num_cpus::get)
}

/// Full `./configure` argument list.
pub fn configure_args(iconv_dir: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = CONFIGURE_FLAGS.iter().map(|f| f.to_string()).collect();
    if let Some(dir) = iconv_dir {
        args.push(format!("--with-iconv={}", dir));
    }
    args
}

pub struct Builder<'a> {
    runner: &'a dyn CommandRunner,
    output: &'a Output,
    options: BuildOptions,
}

impl<'a> Builder<'a> {
    pub fn new(runner: &'a dyn CommandRunner, output: &'a Output, options: BuildOptions) -> Self {
        Self {
            runner,
            output,
            options,
        }
    }

    /// Configure then compile the tree at `dir`.
    pub async fn build(&self, version: &Version, dir: &Path) -> Result<BuildReport> {
        let configured = self.configure(version, dir).await?;
        let compiled = self.compile(version, dir).await?;
        Ok(BuildReport {
            configured,
            compiled,
        })
    }

    async fn configure(&self, version: &Version, dir: &Path) -> Result<PhaseOutcome> {
        if dir.join(CONFIGURE_MARKER).exists() {
            debug!("{} exists, skipping configure", CONFIGURE_MARKER);
            self.output
                .spinner("")
                .finish_skipped(format!("PHP {} already configured", version));
            return Ok(PhaseOutcome::Skipped);
        }

        info!("Configuring PHP {} in {}", version, dir.display());
        let spinner = self.output.spinner(format!("Configuring PHP {}...", version));

        let invocation = Invocation::new("./configure")
            .args(configure_args(self.options.iconv_dir.as_deref()))
            .with_working_dir(dir);

        match self
            .runner
            .run_checked(&invocation, self.options.stream_output)
            .await
        {
            Ok(_) => {
                spinner.finish_success(format!("Configured PHP {}", version));
                Ok(PhaseOutcome::Ran)
            }
            Err(e) => {
                spinner.finish_error("Configure failed");
                Err(with_build_fix(e))
            }
        }
    }

    async fn compile(&self, version: &Version, dir: &Path) -> Result<PhaseOutcome> {
        if php_binary(dir).exists() {
            debug!("{} exists, skipping compile", PHP_BINARY);
            self.output
                .spinner("")
                .finish_skipped(format!("PHP {} already compiled", version));
            return Ok(PhaseOutcome::Skipped);
        }

        info!("Compiling PHP {} with {} jobs", version, self.options.jobs);
        let spinner = self.output.spinner(format!(
            "Compiling PHP {} (this may take a few minutes)...",
            version
        ));

        let invocation = Invocation::new("make")
            .arg(format!("-j{}", self.options.jobs))
            .with_working_dir(dir);

        match self
            .runner
            .run_checked(&invocation, self.options.stream_output)
            .await
        {
            Ok(output) => {
                spinner.finish_success(format!("Compiled PHP {}", version));
                debug!(duration_ms = output.duration.as_millis(), "make finished");
                Ok(PhaseOutcome::Ran)
            }
            Err(e) => {
                spinner.finish_error("Compile failed");
                Err(with_build_fix(e))
            }
        }
    }
}

fn with_build_fix(error: Error) -> Error {
    match error {
        Error::CommandFailed { .. } => error.with_fix(Fix::new(
            "Install the PHP build dependencies (a C compiler, libxml2, sqlite3, openssl, curl, zlib, libzip, libjpeg, freetype, gettext headers) and retry",
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;
    use pvm_core::ErrorCode;
    use pvm_ui::Verbosity;
    use tempfile::tempdir;

    fn options(jobs: usize) -> BuildOptions {
        BuildOptions {
            jobs,
            iconv_dir: None,
            stream_output: false,
        }
    }

    #[test]
    fn test_configure_args() {
        let args = configure_args(None);
        assert_eq!(args.len(), CONFIGURE_FLAGS.len());
        assert_eq!(args[0], "--enable-calendar");
        assert_eq!(args.last().unwrap(), "--with-gettext");

        let args = configure_args(Some("/opt/iconv"));
        assert_eq!(args.last().unwrap(), "--with-iconv=/opt/iconv");
    }

    #[test]
    fn test_with_jobs_floor() {
        assert_eq!(BuildOptions::default().with_jobs(0).jobs, 1);
        assert!(BuildOptions::default().jobs >= 1);
    }

    #[tokio::test]
    async fn test_fresh_tree_runs_both_phases() {
        let temp = tempdir().unwrap();
        let runner = RecordingRunner::new();
        let output = Output::with_verbosity(Verbosity::Quiet);

        let report = Builder::new(&runner, &output, options(6))
            .build(&Version::normalize("8.4"), temp.path())
            .await
            .unwrap();

        assert!(report.configured.ran());
        assert!(report.compiled.ran());

        let calls = runner.invocations();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, "./configure");
        assert_eq!(calls[0].args, configure_args(None));
        assert_eq!(calls[0].working_dir.as_deref(), Some(temp.path()));
        assert_eq!(calls[1].program, "make");
        assert_eq!(calls[1].args, vec!["-j6".to_string()]);
    }

    #[tokio::test]
    async fn test_built_tree_skips_both_phases() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join(CONFIGURE_MARKER), "").unwrap();
        std::fs::create_dir_all(temp.path().join("sapi/cli")).unwrap();
        std::fs::write(php_binary(temp.path()), "").unwrap();

        let runner = RecordingRunner::new();
        let output = Output::with_verbosity(Verbosity::Quiet);
        let report = Builder::new(&runner, &output, options(4))
            .build(&Version::normalize("8.4"), temp.path())
            .await
            .unwrap();

        assert_eq!(report.configured, PhaseOutcome::Skipped);
        assert_eq!(report.compiled, PhaseOutcome::Skipped);
        assert!(runner.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_configured_tree_only_compiles() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join(CONFIGURE_MARKER), "").unwrap();

        let runner = RecordingRunner::new();
        let output = Output::with_verbosity(Verbosity::Quiet);
        let report = Builder::new(&runner, &output, options(2))
            .build(&Version::normalize("8.4"), temp.path())
            .await
            .unwrap();

        assert_eq!(report.configured, PhaseOutcome::Skipped);
        assert_eq!(report.compiled, PhaseOutcome::Ran);
        assert_eq!(runner.invocations().len(), 1);
    }

    #[tokio::test]
    async fn test_configure_failure_stops_build() {
        let temp = tempdir().unwrap();
        let runner = RecordingRunner::new().fail_on("./configure");
        let output = Output::with_verbosity(Verbosity::Quiet);

        let err = Builder::new(&runner, &output, options(2))
            .build(&Version::normalize("8.4"), temp.path())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::CommandFailed);
        assert_eq!(err.fixes().len(), 1);
        assert_eq!(runner.invocations().len(), 1);
    }
}
