//! The install run: pre-check, fetch, select, download, install, post-check,
//! with the transcript closed on every exit path.

use std::path::PathBuf;

use log::{debug, error, info, warn};

use hostinst_core::{
    SelectedVersion, download_installer, fetch_release_metadata, installer_file_name,
    installer_url, select_latest,
};
use hostinst_runtime::{
    ASPNETCORE_RUNTIME, HostError, InstalledRuntime, RuntimeHost, newly_installed,
    parse_runtime_list,
};

use crate::config::RunConfig;
use crate::error::RunError;
use crate::transcript::Transcript;

#[derive(Debug)]
pub enum RunOutcome {
    Installed {
        version: String,
        installer: PathBuf,
    },
    /// No release in the feed had a usable ASP.NET Core runtime version.
    NoVersionFound,
    AlreadyInstalled {
        version: String,
    },
    DryRun {
        version: String,
        url: String,
        installer: PathBuf,
    },
    Failed(RunError),
}

impl RunOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Runtime inventories captured by the pre- and post-checks. `None` means the
/// check did not run; an empty list means nothing was found.
#[derive(Debug, Default)]
pub struct Inventories {
    pub before: Option<Vec<InstalledRuntime>>,
    pub after: Option<Vec<InstalledRuntime>>,
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub inventories: Inventories,
    pub transcript: PathBuf,
}

/// Run the whole pipeline. Never fails: fatal errors end up in
/// [`RunOutcome::Failed`], and the transcript is closed before returning.
pub async fn run(config: &RunConfig, host: &dyn RuntimeHost, transcript: Transcript) -> RunReport {
    info!("hostinst {} starting", env!("CARGO_PKG_VERSION"));
    info!("Transcript: {}", transcript.path().display());

    let mut inventories = Inventories::default();
    let outcome = match run_stages(config, host, &mut inventories).await {
        Ok(outcome) => outcome,
        Err(error) => {
            error!("Run failed during {}: {error}", error.stage());
            RunOutcome::Failed(error)
        }
    };

    match &outcome {
        RunOutcome::Installed { version, installer } => info!(
            "ASP.NET Core hosting bundle {version} installed from {}",
            installer.display()
        ),
        RunOutcome::NoVersionFound => {
            warn!("Nothing installed: no ASP.NET Core runtime version found");
        }
        RunOutcome::AlreadyInstalled { version } => {
            info!("Nothing installed: ASP.NET Core runtime {version} is already present");
        }
        RunOutcome::DryRun { version, .. } => info!("Dry run finished for {version}"),
        RunOutcome::Failed(_) => error!("Run finished with errors"),
    }

    let transcript = transcript.finish();
    RunReport {
        outcome,
        inventories,
        transcript,
    }
}

async fn run_stages(
    config: &RunConfig,
    host: &dyn RuntimeHost,
    inventories: &mut Inventories,
) -> Result<RunOutcome, RunError> {
    let before = inspect_runtimes(host, "before installation").await;
    inventories.before = Some(before.clone());

    let client = config.http_client().map_err(RunError::Client)?;
    let metadata_url = config.metadata_url();
    info!("Fetching release metadata from {metadata_url}");
    let metadata = fetch_release_metadata(&client, &metadata_url).await?;
    info!(
        "Release metadata lists {} releases (channel {}, latest release {})",
        metadata.releases.len(),
        metadata.channel_version.as_deref().unwrap_or("unknown"),
        metadata.latest_release.as_deref().unwrap_or("unknown"),
    );

    let Some(selected) = select_latest(&metadata.releases) else {
        warn!("No ASP.NET Core runtime version found in {metadata_url}");
        inventories.after = Some(inspect_runtimes(host, "after installation").await);
        return Ok(RunOutcome::NoVersionFound);
    };
    log_selection(&selected);

    if config.skip_if_installed
        && before
            .iter()
            .any(|runtime| runtime.is(ASPNETCORE_RUNTIME, &selected.version_label))
    {
        info!(
            "{ASPNETCORE_RUNTIME} {} is already installed, skipping download",
            selected.version_label
        );
        inventories.after = Some(inspect_runtimes(host, "after installation").await);
        return Ok(RunOutcome::AlreadyInstalled {
            version: selected.version_label,
        });
    }

    let url = installer_url(&config.download_base_url, &selected.version_label);
    let installer = config
        .download_dir
        .join(installer_file_name(&selected.version_label));

    if config.dry_run {
        info!("Dry run: would download {url} to {}", installer.display());
        info!("Dry run: would run {} {}", installer.display(), config.silent_flag);
        return Ok(RunOutcome::DryRun {
            version: selected.version_label,
            url,
            installer,
        });
    }

    let downloaded = download_installer(
        &client,
        &url,
        &installer,
        selected.hosting_bundle_sha512.as_deref(),
    )
    .await?;
    info!(
        "Installer saved to {} ({} bytes, {})",
        downloaded.path.display(),
        downloaded.bytes,
        if downloaded.verified {
            "SHA-512 verified"
        } else {
            "no published SHA-512"
        }
    );
    debug!("Installer SHA-512: {}", downloaded.sha512);

    let install_error = |source: HostError| RunError::Install {
        installer: downloaded.path.display().to_string(),
        source,
    };
    host.run_installer(&downloaded.path, &config.silent_flag)
        .await
        .map_err(install_error)?
        .check()
        .map_err(install_error)?;
    info!("Installer finished successfully");

    let after = inspect_runtimes(host, "after installation").await;
    log_changes(&before, &after);
    inventories.after = Some(after);

    Ok(RunOutcome::Installed {
        version: selected.version_label,
        installer: downloaded.path,
    })
}

/// Advisory check: an unavailable listing is a warning, never an error.
async fn inspect_runtimes(host: &dyn RuntimeHost, stage: &str) -> Vec<InstalledRuntime> {
    info!("Checking installed .NET runtimes {stage}");
    let listing = host.list_installed_runtimes().await;
    if listing.is_empty() {
        warn!("No .NET runtimes found, or the runtime listing command is unavailable");
        return Vec::new();
    }

    for line in listing.text.lines().filter(|line| !line.trim().is_empty()) {
        info!("  {}", line.trim_end());
    }
    parse_runtime_list(&listing.text)
}

fn log_selection(selected: &SelectedVersion) {
    info!(
        "Latest ASP.NET Core runtime: {} (release {}{})",
        selected.version_label,
        selected.release_version,
        selected
            .release_date
            .as_deref()
            .map(|date| format!(", {date}"))
            .unwrap_or_default()
    );
}

fn log_changes(before: &[InstalledRuntime], after: &[InstalledRuntime]) {
    let added = newly_installed(before, after);
    if added.is_empty() {
        info!("No new runtimes appeared after installation");
        return;
    }
    for runtime in added {
        info!("Newly installed: {} {}", runtime.name, runtime.version);
    }
}
