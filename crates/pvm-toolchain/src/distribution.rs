//! Cache-or-fetch resolution of distribution archives.

use crate::transport::{Transport, partial_path};
use pvm_config::Config;
use pvm_core::{Error, Fix, Result, Version, cache_dest};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Base URL for source archives.
pub const DISTRIBUTION_BASE_URL: &str = "https://www.php.net/distributions";

/// Download URL for a version's source archive.
pub fn distribution_url(version: &Version) -> String {
    format!("{}/{}", DISTRIBUTION_BASE_URL, version.archive_name())
}

/// A source archive available on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub version: Version,
    pub path: PathBuf,
    /// Served from the cache without touching the network.
    pub was_cached: bool,
    /// Bytes transferred, for fresh downloads.
    pub downloaded_bytes: Option<u64>,
}

/// Resolves archives from `{cache_dir}`, downloading on a miss.
pub struct DistributionCache<'a> {
    cache_dir: PathBuf,
    use_cache: bool,
    transport: &'a dyn Transport,
}

impl<'a> DistributionCache<'a> {
    pub fn new(config: &Config, transport: &'a dyn Transport) -> Self {
        Self {
            cache_dir: config.cache_dir.clone(),
            use_cache: config.use_cache,
            transport,
        }
    }

    /// Override the configured `use_cache` setting.
    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Where the archive for `version` is cached.
    pub fn cache_path(&self, version: &Version) -> PathBuf {
        cache_dest(&self.cache_dir, version)
    }

    /// The cached archive, if caching is enabled and one exists.
    ///
    /// Existence is the only validity check.
    pub fn lookup(&self, version: &Version) -> Option<PathBuf> {
        if !self.use_cache {
            return None;
        }
        let path = self.cache_path(version);
        path.is_file().then_some(path)
    }

    /// Return the archive for `version`, fetching it when not cached.
    pub async fn resolve(&self, version: &Version) -> Result<Distribution> {
        if let Some(path) = self.lookup(version) {
            debug!("Cache hit: {}", path.display());
            return Ok(Distribution {
                version: version.clone(),
                path,
                was_cached: true,
                downloaded_bytes: None,
            });
        }

        let dest = self.cache_path(version);
        remove_stale(&dest)?;
        remove_stale(&partial_path(&dest))?;

        let url = distribution_url(version);
        info!("Downloading {} to {}", url, dest.display());
        let label = format!("PHP {}", version);
        let bytes = self.transport.download(&url, &dest, &label).await?;

        Ok(Distribution {
            version: version.clone(),
            path: dest,
            was_cached: false,
            downloaded_bytes: Some(bytes),
        })
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    if path.exists() {
        debug!("Removing stale file: {}", path.display());
        std::fs::remove_file(path)
            .map_err(|e| Error::io("failed to remove stale archive", path, e))?;
    }
    Ok(())
}

/// Hex-encoded SHA-256 of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| Error::io("failed to open archive for checksum", path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| Error::io("failed to read archive for checksum", path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compare a file's SHA-256 against the published digest.
pub fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    let found = sha256_file(path)?;
    if found.eq_ignore_ascii_case(expected.trim()) {
        debug!("Checksum verified: {}", path.display());
        return Ok(());
    }
    Err(Error::ChecksumMismatch {
        path: path.to_path_buf(),
        expected: expected.trim().to_string(),
        found,
        fixes: vec![Fix::new(format!(
            "Delete {} and install again to re-download it",
            path.display()
        ))],
    })
}
