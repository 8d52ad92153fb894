//! `pvm versions`

use pvm_config::Config;
use pvm_core::{Error, Result};
use pvm_toolchain::{FetchVersionsOptions, HttpTransport, ReleaseManifest, fetch_versions};
use pvm_ui::{Output, Style};

pub async fn run(config: &Config, refresh: bool, output: &Output) -> Result<()> {
    let transport = HttpTransport::new().with_progress(false);
    let options = FetchVersionsOptions {
        refresh,
        ..Default::default()
    };

    let spinner = output.spinner("Fetching release manifest...");
    let result = fetch_versions(config, &transport, &options).await;
    spinner.finish_clear();

    match result {
        Ok(manifest) => {
            display(&manifest, output);
            Ok(())
        }
        // Listing is best effort: report and exit cleanly with nothing on stdout.
        Err(e @ Error::ManifestFetch { .. }) => {
            output.print_error(&e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn display(manifest: &ReleaseManifest, output: &Output) {
    for release in manifest.releases() {
        output.print(&format!("Version: {}", Style::version(&release.version)));
        if !release.supported_versions.is_empty() {
            output.print("Supported Versions:");
            for supported in &release.supported_versions {
                output.print(supported);
            }
        }
        output.print("");
    }
}
