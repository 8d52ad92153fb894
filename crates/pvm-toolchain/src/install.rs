//! The install pipeline: resolve, extract, build, record, link.

use crate::activate::{Activation, ActivationTargets, Activator};
use crate::build::{BuildOptions, BuildReport, Builder};
use crate::distribution::{Distribution, DistributionCache, verify_checksum};
use crate::extract::{Extraction, Extractor};
use crate::release::{FetchVersionsOptions, fetch_versions};
use crate::transport::Transport;
use pvm_config::Config;
use pvm_core::{CommandRunner, Error, Fix, Result, Version, install_dir};
use pvm_ui::Output;
use tracing::{info, warn};

/// Options for [`Installer::install`].
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Overrides `Config::use_cache` when set.
    pub use_cache: Option<bool>,
    /// Check the archive against the manifest's SHA-256.
    pub verify: bool,
    /// Activate the version once built.
    pub link: bool,
    pub build: BuildOptions,
    pub manifest: FetchVersionsOptions,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            use_cache: None,
            verify: false,
            link: true,
            build: BuildOptions::default(),
            manifest: FetchVersionsOptions::default(),
        }
    }
}

/// What each stage did.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub version: Version,
    pub distribution: Distribution,
    pub extraction: Extraction,
    pub build: BuildReport,
    /// False when the version was already listed.
    pub newly_recorded: bool,
    pub activation: Option<Activation>,
}

impl InstallReport {
    /// Nothing was downloaded, extracted or built.
    pub fn was_noop(&self) -> bool {
        self.distribution.was_cached
            && self.extraction.was_present
            && !self.build.configured.ran()
            && !self.build.compiled.ran()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallReport {
    pub version: Version,
    pub removed_dir: bool,
    pub was_recorded: bool,
    pub was_active: bool,
}

/// Drives the pipeline stages against one [`Config`].
pub struct Installer<'a> {
    runner: &'a dyn CommandRunner,
    transport: &'a dyn Transport,
    output: &'a Output,
    targets: ActivationTargets,
}

impl<'a> Installer<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        transport: &'a dyn Transport,
        output: &'a Output,
        targets: ActivationTargets,
    ) -> Self {
        Self {
            runner,
            transport,
            output,
            targets,
        }
    }

    /// Install `version`, stopping at the first failing stage.
    ///
    /// The version is recorded in `installed_versions` once built, and
    /// becomes `current_active_version` only if linking succeeds.
    pub async fn install(
        &self,
        config: &mut Config,
        version: &Version,
        options: &InstallOptions,
    ) -> Result<InstallReport> {
        info!("Installing PHP {}", version);

        let mut cache = DistributionCache::new(config, self.transport);
        if let Some(use_cache) = options.use_cache {
            cache = cache.with_use_cache(use_cache);
        }
        let distribution = cache.resolve(version).await?;

        if options.verify {
            self.verify(config, &distribution, &options.manifest).await?;
        }

        let extraction = Extractor::new(&config.install_dir, self.runner, self.output)
            .extract(version, &distribution.path)
            .await?;

        let build = Builder::new(self.runner, self.output, options.build.clone())
            .build(version, &extraction.dir)
            .await?;

        let newly_recorded = config.installed_versions.insert(version.as_str());

        let activation = if options.link {
            Some(use_version(config, self.targets.clone(), version)?)
        } else {
            None
        };

        Ok(InstallReport {
            version: version.clone(),
            distribution,
            extraction,
            build,
            newly_recorded,
            activation,
        })
    }

    async fn verify(
        &self,
        config: &Config,
        distribution: &Distribution,
        manifest_options: &FetchVersionsOptions,
    ) -> Result<()> {
        let manifest = fetch_versions(config, self.transport, manifest_options).await?;
        let archive = distribution.version.archive_name();
        match manifest
            .find_source(&archive)
            .and_then(|s| s.sha256.as_deref())
        {
            Some(expected) => verify_checksum(&distribution.path, expected),
            None => {
                warn!("No published checksum for {}", archive);
                self.output.warn(&format!(
                    "no published checksum for {}, skipping verification",
                    archive
                ));
                Ok(())
            }
        }
    }
}

/// Link an installed version and record it as active.
///
/// `current_active_version` changes only after both links are in place.
pub fn use_version(
    config: &mut Config,
    targets: ActivationTargets,
    version: &Version,
) -> Result<Activation> {
    let activation = Activator::new(&config.install_dir, targets).activate(version)?;
    config.set_active(version);
    Ok(activation)
}

/// Remove an install directory and its list entry.
///
/// Refuses the active version unless `force` is set; a forced removal
/// clears `current_active_version` and leaves the links dangling.
pub fn uninstall(config: &mut Config, version: &Version, force: bool) -> Result<UninstallReport> {
    let dir = install_dir(&config.install_dir, version);
    let was_active = config.active_version() == Some(version.as_str());

    if was_active && !force {
        return Err(Error::config(format!("PHP {} is the active version", version))
            .with_fix(Fix::with_command(
                "Switch to another version first, or force removal",
                format!("pvm uninstall --force {}", version),
            )));
    }

    let was_recorded = config.installed_versions.contains(version.as_str());
    if !dir.exists() && !was_recorded {
        return Err(Error::DistributionNotFound {
            version: version.to_string(),
            path: dir,
            fixes: vec![],
        });
    }

    let removed_dir = if dir.exists() {
        std::fs::remove_dir_all(&dir)
            .map_err(|e| Error::io("failed to remove install directory", &dir, e))?;
        true
    } else {
        false
    };

    config.installed_versions.remove(version.as_str());
    if was_active {
        config.current_active_version.clear();
    }

    info!("Uninstalled PHP {}", version);
    Ok(UninstallReport {
        version: version.clone(),
        removed_dir,
        was_recorded,
        was_active,
    })
}
