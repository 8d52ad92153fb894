//! Activation: pointing the global `php` and `php.ini` links at an install.

use crate::build::php_binary;
use pvm_config::Config;
use pvm_core::{EnvVars, Error, Fix, Result, Version, install_dir};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Development ini shipped in the source tree.
pub const INI_TEMPLATE: &str = "php.ini-development";

/// Locations of the two global links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationTargets {
    pub binary_link: PathBuf,
    pub ini_link: PathBuf,
}

impl ActivationTargets {
    /// `{binary_dir}/php` and `{ini_dir}/php.ini`.
    pub fn in_dirs(binary_dir: &Path, ini_dir: &Path) -> Self {
        Self {
            binary_link: binary_dir.join("php"),
            ini_link: ini_dir.join("php.ini"),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::in_dirs(&config.binary_dir, &config.ini_dir())
    }

    /// Apply `PVM_BINARY_DIR` / `PVM_INI_DIR` when set.
    pub fn with_env_overrides(self) -> Self {
        let binary_link = env_dir(EnvVars::PVM_BINARY_DIR)
            .map(|d| d.join("php"))
            .unwrap_or(self.binary_link);
        let ini_link = env_dir(EnvVars::PVM_INI_DIR)
            .map(|d| d.join("php.ini"))
            .unwrap_or(self.ini_link);
        Self {
            binary_link,
            ini_link,
        }
    }
}

fn env_dir(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Links created by an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub version: Version,
    pub binary: PathBuf,
    pub ini: PathBuf,
}

pub struct Activator {
    install_root: PathBuf,
    targets: ActivationTargets,
}

impl Activator {
    pub fn new(install_root: &Path, targets: ActivationTargets) -> Self {
        Self {
            install_root: install_root.to_path_buf(),
            targets,
        }
    }

    pub fn targets(&self) -> &ActivationTargets {
        &self.targets
    }

    /// Replace both links. The caller records the active version only after
    /// this returns `Ok`.
    ///
    /// The two updates are independent; if the ini link fails the binary
    /// link has already moved. Link targets are always absolute.
    pub fn activate(&self, version: &Version) -> Result<Activation> {
        let root = std::path::absolute(&self.install_root).map_err(|e| {
            Error::io("failed to resolve install directory", &self.install_root, e)
        })?;
        let dir = install_dir(&root, version);
        if !dir.is_dir() {
            return Err(Error::DistributionNotFound {
                version: version.to_string(),
                path: dir,
                fixes: vec![Fix::with_command(
                    "Install it first",
                    format!("pvm install {}", version),
                )],
            });
        }

        let binary = php_binary(&dir);
        let ini = dir.join(INI_TEMPLATE);

        replace_symlink(&binary, &self.targets.binary_link)?;
        replace_symlink(&ini, &self.targets.ini_link)?;

        info!("Activated PHP {}", version);
        Ok(Activation {
            version: version.clone(),
            binary,
            ini,
        })
    }
}

/// Where the binary link currently points, if it is a symlink.
pub fn active_link_target(binary_link: &Path) -> Option<PathBuf> {
    std::fs::read_link(binary_link).ok()
}

fn replace_symlink(source: &Path, link: &Path) -> Result<()> {
    if link.symlink_metadata().is_ok() {
        std::fs::remove_file(link).map_err(|e| link_error(link, e))?;
    }

    symlink(source, link).map_err(|e| link_error(link, e))?;
    debug!("Created symlink: {} -> {}", link.display(), source.display());
    Ok(())
}

#[cfg(unix)]
fn symlink(source: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(not(unix))]
fn symlink(_source: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlink activation requires a unix host",
    ))
}

fn link_error(link: &Path, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        let dir = link.parent().unwrap_or(link);
        return Error::Config {
            message: format!("no permission to write {}", link.display()),
            path: Some(link.to_path_buf()),
            source: Some(Box::new(e)),
            fixes: vec![Fix::new(format!(
                "Re-run with sudo, or point {} / {} at a writable directory instead of {}",
                EnvVars::PVM_BINARY_DIR,
                EnvVars::PVM_INI_DIR,
                dir.display()
            ))],
        };
    }
    Error::io("failed to create symlink", link, e)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pvm_core::ErrorCode;
    use tempfile::tempdir;

    struct Fixture {
        _temp: tempfile::TempDir,
        install_root: PathBuf,
        targets: ActivationTargets,
    }

    fn fixture() -> Fixture {
        let temp = tempdir().unwrap();
        let install_root = temp.path().join("install");
        let bin = temp.path().join("bin");
        let lib = temp.path().join("lib");
        for dir in [&install_root, &bin, &lib] {
            std::fs::create_dir_all(dir).unwrap();
        }
        Fixture {
            targets: ActivationTargets::in_dirs(&bin, &lib),
            install_root,
            _temp: temp,
        }
    }

    #[test]
    fn test_targets_from_config() {
        let mut config = Config::defaults_in(Path::new("/work"));
        config.ini_dir = Some(PathBuf::from("/etc/php"));
        let targets = ActivationTargets::from_config(&config);
        assert_eq!(targets.binary_link, PathBuf::from("/usr/local/bin/php"));
        assert_eq!(targets.ini_link, PathBuf::from("/etc/php/php.ini"));
    }

    #[test]
    fn test_activate_creates_links() {
        let fx = fixture();
        let version = Version::normalize("8.4");
        std::fs::create_dir_all(fx.install_root.join("php-8.4.0")).unwrap();

        let activation = Activator::new(&fx.install_root, fx.targets.clone())
            .activate(&version)
            .unwrap();

        assert_eq!(
            std::fs::read_link(&fx.targets.binary_link).unwrap(),
            fx.install_root.join("php-8.4.0/sapi/cli/php")
        );
        assert_eq!(
            std::fs::read_link(&fx.targets.ini_link).unwrap(),
            fx.install_root.join("php-8.4.0/php.ini-development")
        );
        assert_eq!(
            active_link_target(&fx.targets.binary_link),
            Some(activation.binary)
        );
    }

    #[test]
    fn test_activate_replaces_and_is_idempotent() {
        let fx = fixture();
        std::fs::create_dir_all(fx.install_root.join("php-8.3.0")).unwrap();
        std::fs::create_dir_all(fx.install_root.join("php-8.4.0")).unwrap();
        // A regular file in the way is replaced too.
        std::fs::write(&fx.targets.ini_link, "old").unwrap();

        let activator = Activator::new(&fx.install_root, fx.targets.clone());
        activator.activate(&Version::normalize("8.3")).unwrap();
        activator.activate(&Version::normalize("8.4")).unwrap();
        activator.activate(&Version::normalize("8.4")).unwrap();

        assert_eq!(
            std::fs::read_link(&fx.targets.binary_link).unwrap(),
            fx.install_root.join("php-8.4.0/sapi/cli/php")
        );
    }

    #[test]
    fn test_missing_install_dir() {
        let fx = fixture();
        let err = Activator::new(&fx.install_root, fx.targets.clone())
            .activate(&Version::normalize("7.4"))
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::DistributionNotFound);
        assert_eq!(err.fixes()[0].command.as_deref(), Some("pvm install 7.4.0"));
        assert!(fx.targets.binary_link.symlink_metadata().is_err());
    }

    #[test]
    fn test_relative_install_root_resolves_against_cwd() {
        let fx = fixture();
        let err = Activator::new(Path::new("pvm-relative-root"), fx.targets.clone())
            .activate(&Version::normalize("8.4"))
            .unwrap_err();

        match err {
            Error::DistributionNotFound { path, .. } => {
                assert!(path.is_absolute());
                let cwd = std::env::current_dir().unwrap();
                assert_eq!(path, cwd.join("pvm-relative-root/php-8.4.0"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_active_link_target_none_for_missing() {
        let fx = fixture();
        assert!(active_link_target(&fx.targets.binary_link).is_none());
    }
}
