//! The php.net release manifest.
//!
//! `https://www.php.net/releases/index.php?json` returns one entry per major
//! version, keyed by the major number:
//!
//! ```json
//! {
//!   "8": {
//!     "version": "8.4.1",
//!     "date": "21 Nov 2024",
//!     "tags": ["security"],
//!     "source": [
//!       { "filename": "php-8.4.1.tar.gz", "name": "PHP 8.4.1 (tar.gz)",
//!         "sha256": "c3d1ce41...", "date": "21 Nov 2024" }
//!     ],
//!     "supported_versions": ["8.1", "8.2", "8.3", "8.4"]
//!   }
//! }
//! ```

use crate::transport::Transport;
use pvm_config::Config;
use pvm_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Remote release manifest endpoint.
pub const MANIFEST_URL: &str = "https://www.php.net/releases/index.php?json";

/// One downloadable source archive of a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub filename: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Latest release of one major line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub version: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Vec<SourceEntry>,
    #[serde(default)]
    pub supported_versions: Vec<String>,
}

/// Release metadata keyed by major version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseManifest(BTreeMap<String, Release>);

impl ReleaseManifest {
    /// Parse the raw manifest document.
    pub fn parse(bytes: &[u8]) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Releases, newest version first.
    pub fn releases(&self) -> Vec<&Release> {
        let mut releases: Vec<&Release> = self.0.values().collect();
        releases.sort_by(|a, b| compare_versions(&b.version, &a.version));
        releases
    }

    /// Find a source entry by archive filename across all releases.
    pub fn find_source(&self, filename: &str) -> Option<&SourceEntry> {
        self.0
            .values()
            .flat_map(|r| r.source.iter())
            .find(|s| s.filename == filename)
    }
}

/// Compare dotted versions numerically, falling back to string order for
/// non-numeric components.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Options for [`fetch_versions`].
#[derive(Debug, Clone)]
pub struct FetchVersionsOptions {
    /// Manifest endpoint.
    pub url: String,
    /// Skip the local cache and always ask the remote.
    pub refresh: bool,
}

impl Default for FetchVersionsOptions {
    fn default() -> Self {
        Self {
            url: MANIFEST_URL.to_string(),
            refresh: false,
        }
    }
}

/// Load the release manifest, preferring `{cache_dir}/versions.json`.
///
/// On a cache miss or unparseable cache the remote manifest is fetched once
/// and its raw bytes overwrite the cache file.
pub async fn fetch_versions(
    config: &Config,
    transport: &dyn Transport,
    options: &FetchVersionsOptions,
) -> Result<ReleaseManifest> {
    let cache_path = config.manifest_cache_path();

    if !options.refresh {
        match load_cached(&cache_path) {
            Ok(manifest) => {
                debug!("Using cached release manifest: {}", cache_path.display());
                return Ok(manifest);
            }
            Err(e) => debug!("Cached manifest unavailable: {}", e),
        }
    }

    info!("Fetching release manifest from {}", options.url);
    let bytes = transport
        .get(&options.url)
        .await
        .map_err(|e| Error::ManifestFetch {
            message: format!("could not fetch {}", options.url),
            source: Some(Box::new(e)),
        })?;

    let manifest = ReleaseManifest::parse(&bytes).map_err(|e| Error::ManifestFetch {
        message: format!("invalid manifest from {}", options.url),
        source: Some(Box::new(e)),
    })?;

    if let Err(e) = std::fs::write(&cache_path, &bytes) {
        warn!(
            "Failed to cache release manifest at {}: {}",
            cache_path.display(),
            e
        );
    }

    Ok(manifest)
}

fn load_cached(path: &Path) -> std::result::Result<ReleaseManifest, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let manifest = ReleaseManifest::parse(&bytes).map_err(|e| e.to_string())?;
    if manifest.is_empty() {
        return Err("manifest is empty".to_string());
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StaticTransport, sample_manifest_json};
    use pvm_core::ErrorCode;
    use tempfile::tempdir;

    fn config_in(root: &Path) -> Config {
        let config = Config::defaults_in(root);
        config.ensure_dirs().unwrap();
        config
    }

    #[test]
    fn test_parse_manifest() {
        let manifest = ReleaseManifest::parse(sample_manifest_json().as_bytes()).unwrap();
        assert_eq!(manifest.len(), 2);

        let releases = manifest.releases();
        assert_eq!(releases[0].version, "8.4.1");
        assert_eq!(releases[1].version, "7.4.33");
        assert_eq!(releases[0].supported_versions.len(), 4);
    }

    #[test]
    fn test_find_source() {
        let manifest = ReleaseManifest::parse(sample_manifest_json().as_bytes()).unwrap();
        let source = manifest.find_source("php-8.4.1.tar.gz").unwrap();
        assert!(source.sha256.is_some());
        assert!(manifest.find_source("php-5.6.0.tar.gz").is_none());
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("8.10.0", "8.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("8.4", "8.4.0"), Ordering::Less);
        assert_eq!(compare_versions("7.4.33", "7.4.33"), Ordering::Equal);
    }

    #[tokio::test]
    async fn test_fetch_versions_prefers_cache() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        std::fs::write(config.manifest_cache_path(), sample_manifest_json()).unwrap();

        let transport = StaticTransport::new();
        let manifest = fetch_versions(&config, &transport, &FetchVersionsOptions::default())
            .await
            .unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(transport.get_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_versions_writes_through() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        std::fs::write(config.manifest_cache_path(), "garbage").unwrap();

        let transport = StaticTransport::new().with_document(MANIFEST_URL, sample_manifest_json());
        let manifest = fetch_versions(&config, &transport, &FetchVersionsOptions::default())
            .await
            .unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(transport.get_count(), 1);
        assert_eq!(
            std::fs::read_to_string(config.manifest_cache_path()).unwrap(),
            sample_manifest_json()
        );
    }

    #[tokio::test]
    async fn test_fetch_versions_refresh_skips_cache() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        std::fs::write(config.manifest_cache_path(), sample_manifest_json()).unwrap();

        let transport = StaticTransport::new().with_document(MANIFEST_URL, sample_manifest_json());
        let options = FetchVersionsOptions {
            refresh: true,
            ..Default::default()
        };
        fetch_versions(&config, &transport, &options).await.unwrap();
        assert_eq!(transport.get_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_versions_both_unavailable() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());

        let transport = StaticTransport::new();
        let err = fetch_versions(&config, &transport, &FetchVersionsOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ManifestFetch);
        assert!(!config.manifest_cache_path().exists());
    }
}
