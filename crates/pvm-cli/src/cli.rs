//! CLI argument parsing.

use clap::{Args, Parser, Subcommand};
use pvm_core::EnvVars;
use std::path::PathBuf;

use crate::styles::STYLES;

/// pvm - PHP Version Manager
#[derive(Parser, Debug)]
#[command(name = "pvm")]
#[command(author, version, about = "Build, cache, and switch between PHP versions")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(styles = STYLES)]
#[command(after_help = "Use `pvm help <command>` for more information about a command.")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose output and stream build tool output
    #[arg(short, long, global = true, env = EnvVars::PVM_VERBOSE)]
    pub verbose: bool,

    /// Suppress status output
    #[arg(short, long, global = true, env = EnvVars::PVM_QUIET)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the configuration file [default: ./.pvm/config.json]
    #[arg(long, global = true, env = EnvVars::PVM_CONFIG_FILE)]
    pub config_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available PHP releases
    Versions {
        /// Ignore the cached release manifest
        #[arg(long)]
        refresh: bool,
    },

    /// Download, build, and activate a PHP version
    Install {
        /// Version to install (e.g. 8.4 or 8.4.1)
        #[arg(id = "php_version", value_name = "VERSION")]
        version: String,

        /// Check the archive against the published SHA-256
        #[arg(long)]
        verify: bool,

        /// Number of parallel make jobs
        #[arg(short, long, env = EnvVars::PVM_JOBS)]
        jobs: Option<usize>,

        /// Download the archive even if it is cached
        #[arg(long)]
        no_cache: bool,

        /// Build without switching the active version
        #[arg(long)]
        no_link: bool,
    },

    /// Switch the global php to an installed version
    Use {
        /// Version to activate
        #[arg(id = "php_version", value_name = "VERSION")]
        version: String,
    },

    /// List installed versions
    List,

    /// Show the active version
    Current,

    /// Remove an installed version
    Uninstall {
        /// Version to remove
        #[arg(id = "php_version", value_name = "VERSION")]
        version: String,

        /// Remove even if it is the active version
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Subcommand name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Versions { .. } => "versions",
            Commands::Install { .. } => "install",
            Commands::Use { .. } => "use",
            Commands::List => "list",
            Commands::Current => "current",
            Commands::Uninstall { .. } => "uninstall",
        }
    }
}
