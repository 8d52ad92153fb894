//! Loading and persisting the config document.

use crate::Config;
use pvm_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Owns the in-memory [`Config`] for one pvm invocation.
///
/// The config is written back when [`ConfigStore::close`] is called, or on
/// drop if it never was, so failed runs still persist whatever the pipeline
/// recorded before the error.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
    closed: bool,
}

impl ConfigStore {
    /// Open the config at `path`, with defaults rooted at the working directory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let root = std::env::current_dir()
            .map_err(|e| Error::io("failed to determine working directory", ".", e))?;
        Self::open_in(path, &root)
    }

    /// Open the config at `path`, with defaults rooted at `root`.
    ///
    /// - A missing file is created empty (along with its parent directory).
    /// - An unreadable file is [`Error::ConfigLoad`].
    /// - An unparseable file is replaced by defaults, which are persisted
    ///   immediately.
    pub fn open_in(path: impl Into<PathBuf>, root: &Path) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            create_empty(&path)?;
        }

        let content = std::fs::read_to_string(&path).map_err(|e| Error::ConfigLoad {
            path: path.clone(),
            source: e,
        })?;

        let store = match Config::parse(&content) {
            Ok(mut config) => {
                debug!("Loaded config from {}", path.display());
                config.fill_missing(root);
                Self {
                    path,
                    config,
                    closed: false,
                }
            }
            Err(e) => {
                if !content.trim().is_empty() {
                    warn!("Config at {} is invalid ({}), using defaults", path.display(), e);
                } else {
                    debug!("Config at {} is empty, writing defaults", path.display());
                }
                let store = Self {
                    path,
                    config: Config::defaults_in(root),
                    closed: false,
                };
                store.persist()?;
                store
            }
        };

        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Truncate and rewrite the backing file with the current config.
    pub fn persist(&self) -> Result<()> {
        let content = self.config.to_json()?;
        std::fs::write(&self.path, content)
            .map_err(|e| Error::io("failed to write config", &self.path, e))?;
        debug!("Saved config to {}", self.path.display());
        Ok(())
    }

    /// Persist and release the store.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.persist()
    }
}

impl Drop for ConfigStore {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.persist() {
            warn!("Failed to save config on exit: {}", e);
        }
    }
}

fn create_empty(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::io("failed to create config directory", parent, e))?;
        }
    }
    std::fs::write(path, "").map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: e,
    })
}
