//! `pvm install`

use super::activation_targets;
use pvm_config::Config;
use pvm_core::{ProcessRunner, Result, Version};
use pvm_toolchain::{BuildOptions, HttpTransport, InstallOptions, Installer};
use pvm_ui::{Output, Style, Verbosity};
use std::time::Instant;

pub struct InstallArgs {
    pub verify: bool,
    pub jobs: Option<usize>,
    pub no_cache: bool,
    pub no_link: bool,
}

pub async fn run(
    config: &mut Config,
    token: &str,
    args: &InstallArgs,
    output: &Output,
) -> Result<()> {
    let start = Instant::now();
    let version = Version::normalize(token);
    output.status("Installing", &format!("PHP {}", Style::version(&version)));

    let runner = ProcessRunner::new();
    let transport = HttpTransport::new().with_progress(output.verbosity() == Verbosity::Normal);
    let targets = activation_targets(config);
    let installer = Installer::new(&runner, &transport, output, targets.clone());

    let mut build = BuildOptions::from_env().with_stream_output(output.is_verbose());
    if let Some(jobs) = args.jobs {
        build = build.with_jobs(jobs);
    }
    let options = InstallOptions {
        use_cache: args.no_cache.then_some(false),
        verify: args.verify,
        link: !args.no_link,
        build,
        ..Default::default()
    };

    let report = installer.install(config, &version, &options).await?;

    if report.distribution.was_cached {
        output.verbose(&format!(
            "Using cached archive {}",
            report.distribution.path.display()
        ));
    }
    if report.extraction.was_present {
        output.verbose(&format!("Reusing {}", report.extraction.dir.display()));
    }

    if report.was_noop() {
        output.status("Fresh", &format!("PHP {} is already built", version));
    }
    match &report.activation {
        Some(activation) => output.status(
            "Linked",
            &format!(
                "{} -> {}",
                targets.binary_link.display(),
                activation.binary.display()
            ),
        ),
        None => output.info(&format!(
            "Run `{}` to activate it",
            Style::command(format!("pvm use {}", version))
        )),
    }

    output.success_summary(&format!("Installed PHP {}", version), start.elapsed());
    Ok(())
}
