//! PHP distribution management for pvm.
//!
//! This crate handles:
//! - Reading the php.net release manifest
//! - Resolving source archives from the local cache or the network
//! - Extracting and building source trees with the system toolchain
//! - Activating a build through global symlinks

pub mod activate;
pub mod build;
pub mod distribution;
pub mod extract;
pub mod install;
pub mod release;
pub mod transport;

#[cfg(test)]
mod testing;

pub use activate::{Activation, ActivationTargets, Activator, active_link_target};
pub use build::{BuildOptions, BuildReport, Builder, PhaseOutcome};
pub use distribution::{Distribution, DistributionCache, distribution_url, verify_checksum};
pub use extract::{Extraction, Extractor};
pub use install::{
    InstallOptions, InstallReport, Installer, UninstallReport, uninstall, use_version,
};
pub use release::{FetchVersionsOptions, Release, ReleaseManifest, SourceEntry, fetch_versions};
pub use transport::{HttpTransport, Transport};
