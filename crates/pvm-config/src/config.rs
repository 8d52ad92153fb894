//! The persisted configuration document.
//!
//! Stored as JSON (by default at `./.pvm/config.json`):
//!
//! ```json
//! {
//!   "use_cache": true,
//!   "install_dir": "/home/me/pvm/install/",
//!   "current_active_version": "8.4.0",
//!   "binary_dir": "/usr/local/bin",
//!   "cache_dir": "/home/me/pvm/cache/",
//!   "installed_versions": ["8.3.0", "8.4.0"]
//! }
//! ```

use crate::InstalledVersions;
use pvm_core::{Error, Result, Version};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the global `php` link lives unless configured otherwise.
pub const DEFAULT_BINARY_DIR: &str = "/usr/local/bin";

/// Where the global `php.ini` link lives unless configured otherwise.
pub const DEFAULT_INI_DIR: &str = "/usr/local/lib";

/// Process-wide pvm state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Reuse cached archives instead of downloading again.
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,

    /// Root under which `php-{version}` trees are extracted.
    #[serde(default)]
    pub install_dir: PathBuf,

    /// Version the global links point at; empty when none.
    #[serde(default)]
    pub current_active_version: String,

    /// Directory for the global `php` link.
    #[serde(default)]
    pub binary_dir: PathBuf,

    /// Directory for cached archives and the release manifest.
    #[serde(default)]
    pub cache_dir: PathBuf,

    /// Versions installed through pvm, in install order.
    #[serde(default)]
    pub installed_versions: InstalledVersions,

    /// Directory for the global `php.ini` link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ini_dir: Option<PathBuf>,
}

fn default_use_cache() -> bool {
    true
}

impl Config {
    /// Defaults rooted at `root` (normally the working directory).
    pub fn defaults_in(root: &Path) -> Self {
        Self {
            use_cache: true,
            install_dir: dir_with_separator(root.join("install")),
            current_active_version: String::new(),
            binary_dir: PathBuf::from(DEFAULT_BINARY_DIR),
            cache_dir: dir_with_separator(root.join("cache")),
            installed_versions: InstalledVersions::new(),
            ini_dir: None,
        }
    }

    /// Parse a config document.
    pub fn parse(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize the config document.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))
    }

    /// Fill any empty directory settings from the defaults rooted at `root`.
    pub fn fill_missing(&mut self, root: &Path) {
        let defaults = Self::defaults_in(root);
        if self.install_dir.as_os_str().is_empty() {
            self.install_dir = defaults.install_dir;
        }
        if self.cache_dir.as_os_str().is_empty() {
            self.cache_dir = defaults.cache_dir;
        }
        if self.binary_dir.as_os_str().is_empty() {
            self.binary_dir = defaults.binary_dir;
        }
    }

    /// Create the install and cache directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.install_dir, &self.cache_dir] {
            if !dir.exists() {
                debug!("Creating directory: {}", dir.display());
                std::fs::create_dir_all(dir)
                    .map_err(|e| Error::io("failed to create directory", dir, e))?;
            }
        }
        Ok(())
    }

    /// The active version, if one is recorded.
    pub fn active_version(&self) -> Option<&str> {
        let v = self.current_active_version.trim();
        if v.is_empty() { None } else { Some(v) }
    }

    /// Record a successful activation.
    pub fn set_active(&mut self, version: &Version) {
        self.current_active_version = version.to_string();
    }

    /// Directory for the global `php.ini` link.
    pub fn ini_dir(&self) -> PathBuf {
        self.ini_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INI_DIR))
    }

    /// Path to the cached release manifest.
    pub fn manifest_cache_path(&self) -> PathBuf {
        self.cache_dir.join(crate::MANIFEST_CACHE_FILENAME)
    }
}

/// Keep the trailing separator the stored paths have always carried.
fn dir_with_separator(path: PathBuf) -> PathBuf {
    let mut s = path.into_os_string();
    s.push(std::path::MAIN_SEPARATOR_STR);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::defaults_in(Path::new("/work"));
        assert!(config.use_cache);
        assert_eq!(config.install_dir, PathBuf::from("/work/install/"));
        assert_eq!(config.cache_dir, PathBuf::from("/work/cache/"));
        assert_eq!(config.binary_dir, PathBuf::from(DEFAULT_BINARY_DIR));
        assert!(config.installed_versions.is_empty());
        assert!(config.active_version().is_none());
    }

    #[test]
    fn test_parse_full_document() {
        let json = r#"{
            "use_cache": false,
            "install_dir": "/opt/pvm/install/",
            "current_active_version": "8.3.0",
            "binary_dir": "/opt/bin",
            "cache_dir": "/opt/pvm/cache/",
            "installed_versions": ["8.2.0", "8.3.0"]
        }"#;
        let config = Config::parse(json).unwrap();
        assert!(!config.use_cache);
        assert_eq!(config.active_version(), Some("8.3.0"));
        assert_eq!(config.binary_dir, PathBuf::from("/opt/bin"));
        assert_eq!(config.installed_versions.len(), 2);
        assert_eq!(config.ini_dir(), PathBuf::from(DEFAULT_INI_DIR));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(Config::parse("").is_err());
        assert!(Config::parse("not json").is_err());
    }

    #[test]
    fn test_fill_missing() {
        let mut config = Config::parse("{}").unwrap();
        assert!(config.use_cache);
        config.fill_missing(Path::new("/work"));
        assert_eq!(config.install_dir, PathBuf::from("/work/install/"));
        assert_eq!(config.cache_dir, PathBuf::from("/work/cache/"));
    }

    #[test]
    fn test_ini_dir_omitted_when_unset() {
        let config = Config::defaults_in(Path::new("/work"));
        let json = config.to_json().unwrap();
        assert!(!json.contains("ini_dir"));
        assert!(json.contains("\"installed_versions\": []"));
    }

    #[test]
    fn test_set_active() {
        let mut config = Config::defaults_in(Path::new("/work"));
        config.set_active(&Version::normalize("8.4"));
        assert_eq!(config.active_version(), Some("8.4.0"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::defaults_in(temp.path());
        config.ensure_dirs().unwrap();
        assert!(temp.path().join("install").is_dir());
        assert!(temp.path().join("cache").is_dir());
    }
}
