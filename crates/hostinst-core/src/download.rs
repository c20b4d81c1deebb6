use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use sha2::{Digest, Sha512};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Default base URL for ASP.NET Core runtime downloads.
pub const DEFAULT_DOWNLOAD_BASE_URL: &str =
    "https://builds.dotnet.microsoft.com/dotnet/aspnetcore/Runtime";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to download installer from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("installer download from {url} failed with HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("installer checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

impl DownloadError {
    fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadedInstaller {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha512: String,
    pub verified: bool,
}

#[must_use]
pub fn installer_file_name(version: &str) -> String {
    format!("dotnet-hosting-{version}-win.exe")
}

/// `{base}/{version}/dotnet-hosting-{version}-win.exe`
#[must_use]
pub fn installer_url(base: &str, version: &str) -> String {
    format!(
        "{}/{version}/{}",
        base.trim_end_matches('/'),
        installer_file_name(version)
    )
}

/// Stream the installer at `url` into `dest`, creating the parent directory
/// when needed.
///
/// When `expected_sha512` is given the file's digest must match it. The file
/// is deleted when the transfer breaks off or the digest does not match.
///
/// # Errors
/// Returns an error when the request fails, the server answers with a
/// non-success status, writing to disk fails, or the checksum does not match.
pub async fn download_installer(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    expected_sha512: Option<&str>,
) -> Result<DownloadedInstaller, DownloadError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|error| {
            DownloadError::io("failed to create download directory", parent, error)
        })?;
    }

    info!("Downloading installer from {url}");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| DownloadError::Request {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let total = response.content_length();
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|error| DownloadError::io("failed to create installer file", dest, error))?;
    let written = write_body(response, &mut file, url, dest).await;
    drop(file);

    let (downloaded, actual) = match written {
        Ok(written) => written,
        Err(error) => {
            warn!("Removing partial installer: {}", dest.display());
            remove_installer(dest).await;
            return Err(error);
        }
    };

    match total {
        Some(total) => info!("Download complete: {downloaded} of {total} bytes"),
        None => info!("Download complete: {downloaded} bytes"),
    }

    let verified = match expected_sha512 {
        Some(expected) => {
            if let Err(error) = verify_sha512(&actual, expected) {
                warn!("Removing installer with bad checksum: {}", dest.display());
                remove_installer(dest).await;
                return Err(error);
            }
            info!("Installer SHA-512 verified");
            true
        }
        None => {
            debug!("No published SHA-512 for installer, skipping verification");
            false
        }
    };

    Ok(DownloadedInstaller {
        path: dest.to_path_buf(),
        bytes: downloaded,
        sha512: actual,
        verified,
    })
}

/// Stream the response body into `file`, returning the byte count and the
/// hex SHA-512 of what was written.
async fn write_body(
    response: reqwest::Response,
    file: &mut tokio::fs::File,
    url: &str,
    dest: &Path,
) -> Result<(u64, String), DownloadError> {
    use futures_util::StreamExt;

    let mut hasher = Sha512::new();
    let mut downloaded: u64 = 0;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| DownloadError::Request {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|error| DownloadError::io("failed to write installer data", dest, error))?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|error| DownloadError::io("failed to flush installer file", dest, error))?;

    Ok((downloaded, format!("{:x}", hasher.finalize())))
}

async fn remove_installer(dest: &Path) {
    if let Err(error) = tokio::fs::remove_file(dest).await {
        warn!("Failed to remove {}: {error}", dest.display());
    }
}

fn verify_sha512(actual: &str, expected: &str) -> Result<(), DownloadError> {
    let expected = expected.trim();
    if actual.eq_ignore_ascii_case(expected) {
        return Ok(());
    }

    Err(DownloadError::ChecksumMismatch {
        expected: expected.to_ascii_lowercase(),
        actual: actual.to_string(),
    })
}
