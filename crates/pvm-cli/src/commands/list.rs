//! `pvm list` and `pvm current`

use super::activation_targets;
use pvm_config::Config;
use pvm_core::Result;
use pvm_toolchain::active_link_target;
use pvm_ui::{Output, Style};

/// Installed versions on stdout, the active one marked with `*`.
pub fn installed(config: &Config, output: &Output) -> Result<()> {
    if config.installed_versions.is_empty() {
        output.info("No PHP versions installed");
        return Ok(());
    }

    let active = config.active_version();
    for version in config.installed_versions.iter() {
        if Some(version) == active {
            output.print(&format!("* {}", Style::version(version)));
        } else {
            output.print(&format!("  {}", version));
        }
    }
    Ok(())
}

pub fn current(config: &Config, output: &Output) -> Result<()> {
    let Some(version) = config.active_version() else {
        output.info("No active PHP version");
        return Ok(());
    };

    output.print(version);

    let link = activation_targets(config).binary_link;
    match active_link_target(&link) {
        Some(target) => output.list_item(
            &link.display().to_string(),
            &target.display().to_string(),
        ),
        None => output.warn(&format!("{} is not a symlink", link.display())),
    }
    Ok(())
}
