//! `pvm use`

use super::activation_targets;
use pvm_config::Config;
use pvm_core::{Result, Version};
use pvm_toolchain::use_version;
use pvm_ui::{Output, Style};

pub fn run(config: &mut Config, token: &str, output: &Output) -> Result<()> {
    let version = Version::normalize(token);
    let targets = activation_targets(config);

    let activation = use_version(config, targets.clone(), &version)?;

    output.status(
        "Using",
        &format!("PHP {}", Style::version(&activation.version)),
    );
    output.list_item("php", &targets.binary_link.display().to_string());
    output.list_item("php.ini", &targets.ini_link.display().to_string());
    Ok(())
}
