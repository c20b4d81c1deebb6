use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use hostinst_core::{DEFAULT_DOWNLOAD_BASE_URL, metadata_url};
use hostinst_platform::AppPaths;

/// Everything one run needs to know. Loaded from JSON, then overridden by
/// command-line flags.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_channel")]
    pub channel: String,

    #[serde(default)]
    pub metadata_url: Option<String>,

    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    #[serde(default = "default_runtime_list_command")]
    pub runtime_list_command: String,

    #[serde(default = "default_runtime_list_arg")]
    pub runtime_list_arg: String,

    #[serde(default = "default_silent_flag")]
    pub silent_flag: String,

    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub skip_if_installed: bool,

    #[serde(default)]
    pub debug_logging: bool,
}

fn default_channel() -> String {
    "9.0".to_string()
}

fn default_download_base_url() -> String {
    DEFAULT_DOWNLOAD_BASE_URL.to_string()
}

fn default_log_dir() -> PathBuf {
    AppPaths::new().map_or_else(
        |_| std::env::temp_dir().join("hostinst").join("logs"),
        |paths| paths.log_dir,
    )
}

fn default_download_dir() -> PathBuf {
    AppPaths::new().map_or_else(
        |_| std::env::temp_dir().join("hostinst").join("downloads"),
        |paths| paths.download_dir,
    )
}

fn default_runtime_list_command() -> String {
    "dotnet".to_string()
}

fn default_runtime_list_arg() -> String {
    "--list-runtimes".to_string()
}

fn default_silent_flag() -> String {
    "/quiet".to_string()
}

fn default_max_log_files() -> usize {
    30
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            metadata_url: None,
            download_base_url: default_download_base_url(),
            log_dir: default_log_dir(),
            download_dir: default_download_dir(),
            runtime_list_command: default_runtime_list_command(),
            runtime_list_arg: default_runtime_list_arg(),
            silent_flag: default_silent_flag(),
            http_timeout_secs: None,
            max_log_files: default_max_log_files(),
            dry_run: false,
            skip_if_installed: false,
            debug_logging: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RunConfig {
    /// Load the configuration from `explicit`, or from the per-user config
    /// file when it exists, or fall back to defaults.
    ///
    /// # Errors
    /// Returns an error when the chosen file cannot be read or parsed. An
    /// explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match AppPaths::new() {
            Ok(paths) if paths.config_file().is_file() => Self::from_file(&paths.config_file()),
            _ => Ok(Self::default()),
        }
    }

    /// Read one JSON config file.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The explicit metadata URL, or the channel's default one.
    #[must_use]
    pub fn metadata_url(&self) -> String {
        self.metadata_url
            .clone()
            .unwrap_or_else(|| metadata_url(&self.channel))
    }

    /// HTTP client shared by the metadata fetch and the installer download.
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("hostinst/{}", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = self.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }
}
