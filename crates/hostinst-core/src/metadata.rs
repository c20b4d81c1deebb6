use serde::Deserialize;
use thiserror::Error;

const METADATA_BASE_URL: &str = "https://builds.dotnet.microsoft.com/dotnet/release-metadata";

/// File name the release feed uses for the Windows hosting bundle entry.
pub const HOSTING_BUNDLE_FILE: &str = "dotnet-hosting-win.exe";

/// Parsed `releases.json` for one runtime channel (for example `9.0`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseMetadata {
    #[serde(rename = "channel-version", default)]
    pub channel_version: Option<String>,
    #[serde(rename = "latest-release", default)]
    pub latest_release: Option<String>,
    #[serde(default)]
    pub releases: Vec<ReleaseEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseEntry {
    #[serde(rename = "release-version")]
    pub release_version: String,
    #[serde(rename = "release-date", default)]
    pub release_date: Option<String>,
    #[serde(rename = "aspnetcore-runtime", default)]
    pub aspnetcore_runtime: Option<AspNetCoreRuntime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AspNetCoreRuntime {
    pub version: String,
    #[serde(default)]
    pub files: Vec<ReleaseFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub hash: Option<String>,
}

impl AspNetCoreRuntime {
    /// Published SHA-512 of the Windows hosting bundle, if the feed lists one.
    #[must_use]
    pub fn hosting_bundle_sha512(&self) -> Option<&str> {
        self.files
            .iter()
            .find(|file| file.name.eq_ignore_ascii_case(HOSTING_BUNDLE_FILE))
            .and_then(|file| file.hash.as_deref())
            .map(str::trim)
            .filter(|hash| !hash.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to fetch release metadata from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("release metadata request to {url} failed with HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to parse release metadata from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Metadata URL for a `major.minor` runtime channel.
#[must_use]
pub fn metadata_url(channel: &str) -> String {
    format!("{METADATA_BASE_URL}/{}/releases.json", channel.trim())
}

/// Download and parse the release metadata document at `url`.
///
/// A single attempt is made; callers treat any error as fatal.
///
/// # Errors
/// Returns an error when the request fails, the server answers with a
/// non-success status, or the body is not a release metadata document.
pub async fn fetch_release_metadata(
    client: &reqwest::Client,
    url: &str,
) -> Result<ReleaseMetadata, MetadataError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| MetadataError::Request {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(MetadataError::HttpStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| MetadataError::Request {
            url: url.to_string(),
            source,
        })?;

    parse_release_metadata(&body).map_err(|source| MetadataError::Parse {
        url: url.to_string(),
        source,
    })
}

/// Parse a release metadata document.
///
/// # Errors
/// Returns an error when `body` is not valid JSON or lacks required fields.
pub fn parse_release_metadata(body: &[u8]) -> Result<ReleaseMetadata, serde_json::Error> {
    serde_json::from_slice(body)
}
