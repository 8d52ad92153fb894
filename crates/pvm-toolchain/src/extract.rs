//! Unpacking source archives into the install root.

use pvm_core::{CommandRunner, Error, Invocation, Result, Version, install_dir};
use pvm_ui::Output;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An extracted source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub dir: PathBuf,
    /// The directory already existed and extraction was skipped.
    pub was_present: bool,
}

/// Extracts `php-{version}.tar.gz` archives with the system `tar`.
pub struct Extractor<'a> {
    install_root: PathBuf,
    runner: &'a dyn CommandRunner,
    output: &'a Output,
}

impl<'a> Extractor<'a> {
    pub fn new(install_root: &Path, runner: &'a dyn CommandRunner, output: &'a Output) -> Self {
        Self {
            install_root: install_root.to_path_buf(),
            runner,
            output,
        }
    }

    /// Unpack `archive` unless `{install_root}/php-{version}` already exists.
    ///
    /// A partially extracted directory counts as present.
    pub async fn extract(&self, version: &Version, archive: &Path) -> Result<Extraction> {
        let dir = install_dir(&self.install_root, version);
        if dir.exists() {
            debug!("Already extracted: {}", dir.display());
            return Ok(Extraction {
                dir,
                was_present: true,
            });
        }

        info!("Extracting {} to {}", archive.display(), self.install_root.display());
        let spinner = self.output.spinner(format!("Extracting PHP {}...", version));

        let invocation = Invocation::new("tar")
            .arg("-xzf")
            .arg(archive.display().to_string())
            .arg("-C")
            .arg(self.install_root.display().to_string());

        if let Err(e) = self
            .runner
            .run_checked(&invocation, self.output.is_verbose())
            .await
        {
            spinner.finish_error(format!("Failed to extract PHP {}", version));
            return Err(e);
        }

        if !dir.is_dir() {
            spinner.finish_error(format!("Failed to extract PHP {}", version));
            return Err(Error::config_at(
                format!(
                    "{} did not contain a php-{} directory",
                    archive.display(),
                    version
                ),
                dir,
            ));
        }

        spinner.finish_success(format!("Extracted PHP {}", version));
        Ok(Extraction {
            dir,
            was_present: false,
        })
    }
}
