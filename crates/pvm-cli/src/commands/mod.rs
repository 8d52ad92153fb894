//! Command implementations.

mod install;
mod list;
mod uninstall;
mod use_version;
mod versions;

use crate::cli::{Cli, Commands};
use anyhow::Result;
use clap::CommandFactory;
use pvm_config::{ConfigStore, default_config_path};
use pvm_core::ExitCode;
use pvm_telemetry::TimingGuard;
use pvm_toolchain::ActivationTargets;
use pvm_ui::{Output, Verbosity, style};
use tracing::debug;

/// Run the CLI command.
pub async fn run(cli: Cli) -> Result<i32> {
    style::configure_colors(cli.global.no_color);
    let verbosity = Verbosity::from_flags(cli.global.quiet, cli.global.verbose);
    let output = Output::with_verbosity(verbosity);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::Success.into());
    };

    let config_path = cli.global.config_file.unwrap_or_else(default_config_path);
    debug!("Using config file {}", config_path.display());

    let mut store = match ConfigStore::open(&config_path) {
        Ok(store) => store,
        Err(e) => {
            output.print_error(&e);
            return Ok(ExitCode::for_error(&e).into());
        }
    };
    if let Err(e) = store.config().ensure_dirs() {
        output.print_error(&e);
        return Ok(ExitCode::for_error(&e).into());
    }

    let _timing = TimingGuard::new(command.name());
    let config = store.config_mut();
    let result = match command {
        Commands::Versions { refresh } => versions::run(config, refresh, &output).await,
        Commands::Install {
            version,
            verify,
            jobs,
            no_cache,
            no_link,
        } => {
            let args = install::InstallArgs {
                verify,
                jobs,
                no_cache,
                no_link,
            };
            install::run(config, &version, &args, &output).await
        }
        Commands::Use { version } => use_version::run(config, &version, &output),
        Commands::List => list::installed(config, &output),
        Commands::Current => list::current(config, &output),
        Commands::Uninstall { version, force } => uninstall::run(config, &version, force, &output),
    };

    let result = result.and_then(|()| store.close());
    output.flush();

    match result {
        Ok(()) => Ok(ExitCode::Success.into()),
        Err(e) => {
            output.print_error(&e);
            Ok(ExitCode::for_error(&e).into())
        }
    }
}

/// Link locations for this invocation.
fn activation_targets(config: &pvm_config::Config) -> ActivationTargets {
    ActivationTargets::from_config(config).with_env_overrides()
}
