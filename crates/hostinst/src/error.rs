use thiserror::Error;

use hostinst_core::{DownloadError, MetadataError};
use hostinst_runtime::HostError;

/// A failure that aborts the pipeline.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("installation of {installer} failed: {source}")]
    Install {
        installer: String,
        #[source]
        source: HostError,
    },
}

impl RunError {
    /// Short name of the stage that failed, for the summary line.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Client(_) => "setup",
            Self::Metadata(_) => "metadata fetch",
            Self::Download(_) => "installer download",
            Self::Install { .. } => "installation",
        }
    }
}
