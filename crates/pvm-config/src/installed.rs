//! The ordered set of installed versions.

use serde::{Deserialize, Serialize};

/// Installed versions in install order, each appearing once.
///
/// Serialized as a plain JSON array. Loading a document that already holds
/// duplicates keeps the first occurrence of each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct InstalledVersions(Vec<String>);

impl InstalledVersions {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a version. Returns `false` if it was already present.
    pub fn insert(&mut self, version: impl AsRef<str>) -> bool {
        let version = version.as_ref();
        if self.contains(version) {
            return false;
        }
        self.0.push(version.to_string());
        true
    }

    /// Forget a version. Returns `false` if it was not present.
    pub fn remove(&mut self, version: impl AsRef<str>) -> bool {
        let version = version.as_ref();
        let before = self.0.len();
        self.0.retain(|v| v != version);
        self.0.len() != before
    }

    /// Check whether a version is recorded.
    pub fn contains(&self, version: impl AsRef<str>) -> bool {
        let version = version.as_ref();
        self.0.iter().any(|v| v == version)
    }

    /// Iterate in install order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for InstalledVersions {
    fn from(versions: Vec<String>) -> Self {
        let mut set = Self::new();
        for v in versions {
            set.insert(v);
        }
        set
    }
}

impl From<InstalledVersions> for Vec<String> {
    fn from(set: InstalledVersions) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a InstalledVersions {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
