//! `pvm uninstall`

use pvm_config::Config;
use pvm_core::{Result, Version};
use pvm_ui::Output;

pub fn run(config: &mut Config, token: &str, force: bool, output: &Output) -> Result<()> {
    let version = Version::normalize(token);
    let report = pvm_toolchain::uninstall(config, &version, force)?;

    if report.removed_dir {
        output.status("Removed", &format!("PHP {}", version));
    } else {
        output.status("Forgot", &format!("PHP {} (no install directory)", version));
    }
    if report.was_active {
        output.warn("the active version was removed; the global php link is now dangling");
    }
    Ok(())
}
