//! Release discovery and download logic for hostinst.
//!
//! This crate is independent of process spawning and logging setup:
//! - Channel release metadata model and fetch helper.
//! - Dotted numeric version parsing and ordering.
//! - Selection of the newest ASP.NET Core runtime release.
//! - Hosting bundle URL construction and verified download.

mod download;
mod metadata;
mod select;
mod version;

/// Hosting bundle URL helpers and streaming download with SHA-512 check.
pub use download::{
    DEFAULT_DOWNLOAD_BASE_URL, DownloadError, DownloadedInstaller, download_installer,
    installer_file_name, installer_url,
};
/// Channel `releases.json` model and fetch helper.
pub use metadata::{
    AspNetCoreRuntime, HOSTING_BUNDLE_FILE, MetadataError, ReleaseEntry, ReleaseFile,
    ReleaseMetadata, fetch_release_metadata, metadata_url, parse_release_metadata,
};
/// Newest-release selection.
pub use select::{SelectedVersion, select_latest};
/// Dotted numeric version type.
pub use version::{DottedVersion, VersionParseError};
