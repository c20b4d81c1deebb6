use log::{debug, warn};

use crate::metadata::ReleaseEntry;
use crate::version::DottedVersion;

/// The release chosen for installation.
#[derive(Debug, Clone)]
pub struct SelectedVersion {
    pub version: DottedVersion,
    /// The runtime version exactly as published, used to build download URLs.
    pub version_label: String,
    pub release_version: String,
    pub release_date: Option<String>,
    pub hosting_bundle_sha512: Option<String>,
}

/// Pick the release with the highest ASP.NET Core runtime version.
///
/// Entries without a runtime, or whose runtime version is not dotted-numeric,
/// are skipped. A later entry only replaces the current best when its version
/// is strictly greater, so the first of several equal maxima wins.
#[must_use]
pub fn select_latest(releases: &[ReleaseEntry]) -> Option<SelectedVersion> {
    let mut best: Option<(DottedVersion, &ReleaseEntry)> = None;

    for entry in releases {
        let Some(runtime) = &entry.aspnetcore_runtime else {
            debug!(
                "Release {} has no ASP.NET Core runtime, skipping",
                entry.release_version
            );
            continue;
        };

        let parsed = match runtime.version.parse::<DottedVersion>() {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(
                    "Skipping release {}: unparsable ASP.NET Core runtime version '{}' ({error})",
                    entry.release_version, runtime.version
                );
                continue;
            }
        };

        if best.as_ref().is_none_or(|(current, _)| parsed > *current) {
            best = Some((parsed, entry));
        }
    }

    best.and_then(|(version, entry)| {
        let runtime = entry.aspnetcore_runtime.as_ref()?;
        Some(SelectedVersion {
            version,
            version_label: runtime.version.trim().to_string(),
            release_version: entry.release_version.clone(),
            release_date: entry.release_date.clone(),
            hosting_bundle_sha512: runtime.hosting_bundle_sha512().map(str::to_string),
        })
    })
}
