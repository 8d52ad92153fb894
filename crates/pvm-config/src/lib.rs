//! Configuration for pvm.
//!
//! This crate handles:
//! - The persisted `config.json` document
//! - Default install and cache locations
//! - Scoped persistence through [`ConfigStore`]

pub mod config;
pub mod installed;
pub mod store;

pub use config::{Config, DEFAULT_BINARY_DIR, DEFAULT_INI_DIR};
pub use installed::InstalledVersions;
pub use store::ConfigStore;

/// Directory holding pvm state relative to the working directory.
pub const STATE_DIR_NAME: &str = ".pvm";

/// The config filename inside [`STATE_DIR_NAME`].
pub const CONFIG_FILENAME: &str = "config.json";

/// The release manifest cache filename inside the cache directory.
pub const MANIFEST_CACHE_FILENAME: &str = "versions.json";

/// Default config file location: `./.pvm/config.json`.
pub fn default_config_path() -> std::path::PathBuf {
    std::path::Path::new(STATE_DIR_NAME).join(CONFIG_FILENAME)
}
