use std::path::PathBuf;
use thiserror::Error;

const APP_DIR: &str = "hostinst";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine cache directory")]
    CacheDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
    pub download_dir: PathBuf,
}

impl AppPaths {
    /// Build the default directory layout for the current platform.
    ///
    /// # Errors
    /// Returns an error when a required base directory (home, config, cache
    /// or local data) cannot be determined.
    pub fn new() -> Result<Self, AppPathsError> {
        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;
            Ok(Self {
                config_dir: home.join("Library/Application Support").join(APP_DIR),
                log_dir: home.join("Library/Logs").join(APP_DIR),
                download_dir: home.join("Library/Caches").join(APP_DIR).join("downloads"),
            })
        }

        #[cfg(not(target_os = "macos"))]
        {
            Ok(Self {
                config_dir: dirs::config_dir()
                    .ok_or(AppPathsError::ConfigDirUnavailable)?
                    .join(APP_DIR),
                log_dir: dirs::data_local_dir()
                    .ok_or(AppPathsError::DataDirUnavailable)?
                    .join(APP_DIR)
                    .join("logs"),
                download_dir: dirs::cache_dir()
                    .ok_or(AppPathsError::CacheDirUnavailable)?
                    .join(APP_DIR)
                    .join("downloads"),
            })
        }
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::AppPaths;

    fn test_paths(root: &std::path::Path) -> AppPaths {
        AppPaths {
            config_dir: root.join("config"),
            log_dir: root.join("data").join("logs"),
            download_dir: root.join("cache").join("downloads"),
        }
    }

    #[test]
    fn config_file_lives_in_config_dir() {
        let paths = test_paths(std::path::Path::new("/tmp/hostinst-paths"));

        assert!(
            paths
                .config_file()
                .ends_with(std::path::Path::new("config").join("config.json"))
        );
    }

    #[test]
    fn default_layout_is_namespaced() {
        let Ok(paths) = AppPaths::new() else {
            return;
        };

        assert!(paths.config_dir.ends_with("hostinst"));
        assert!(paths.log_dir.to_string_lossy().contains("hostinst"));
        assert!(paths.download_dir.ends_with("downloads"));
    }
}
