//! Version normalization and the filenames derived from it.
//!
//! Every stage downstream of the CLI works with a [`Version`], which can only
//! be obtained through [`Version::normalize`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A canonical PHP release identifier such as `8.4.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Normalize a user-supplied version token.
    ///
    /// A three-byte token is taken to be `MAJOR.MINOR` and gets `.0`
    /// appended. Anything else passes through unchanged, whitespace included.
    pub fn normalize(input: &str) -> Self {
        if input.len() == 3 {
            Self(format!("{}.0", input))
        } else {
            Self(input.to_string())
        }
    }

    /// The canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the source archive for this version.
    pub fn archive_name(&self) -> String {
        archive_name(self)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `php-{version}.tar.gz`
pub fn archive_name(version: &Version) -> String {
    format!("php-{}.tar.gz", version)
}

/// Location of the cached archive for a version.
pub fn cache_dest(cache_dir: &Path, version: &Version) -> PathBuf {
    cache_dir.join(archive_name(version))
}

/// Location of the extracted tree for a version.
pub fn install_dir(install_root: &Path, version: &Version) -> PathBuf {
    install_root.join(format!("php-{}", version))
}
