use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, trace};
use tokio::process::Command;
use which::which;

use hostinst_platform::NoConsoleWindow;

use crate::error::HostError;
use crate::traits::{InstallerStatus, RuntimeHost, RuntimeListing};

/// [`RuntimeHost`] backed by the `dotnet` CLI and real child processes.
#[derive(Debug, Clone)]
pub struct DotnetHost {
    command: String,
    list_arg: String,
}

impl DotnetHost {
    #[must_use]
    pub fn new(command: impl Into<String>, list_arg: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            list_arg: list_arg.into(),
        }
    }

    fn resolve_command(&self) -> Option<PathBuf> {
        if let Ok(path) = which(&self.command) {
            return Some(path);
        }

        let direct = PathBuf::from(&self.command);
        direct.is_file().then_some(direct)
    }
}

impl Default for DotnetHost {
    fn default() -> Self {
        Self::new("dotnet", "--list-runtimes")
    }
}

#[async_trait]
impl RuntimeHost for DotnetHost {
    async fn list_installed_runtimes(&self) -> RuntimeListing {
        let Some(path) = self.resolve_command() else {
            debug!("'{}' not found on PATH", self.command);
            return RuntimeListing::unavailable();
        };

        debug!("Running {} {}", path.display(), self.list_arg);
        let output = match Command::new(&path)
            .arg(&self.list_arg)
            .no_console_window()
            .output()
            .await
        {
            Ok(output) => output,
            Err(error) => {
                debug!("Failed to run {}: {error}", path.display());
                return RuntimeListing::unavailable();
            }
        };

        trace!("runtime list stdout: {}", String::from_utf8_lossy(&output.stdout));
        if !output.status.success() {
            debug!(
                "{} {} exited with {:?}: {}",
                path.display(),
                self.list_arg,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return RuntimeListing::unavailable();
        }

        RuntimeListing::available(String::from_utf8_lossy(&output.stdout))
    }

    async fn run_installer(
        &self,
        installer: &Path,
        silent_flag: &str,
    ) -> Result<InstallerStatus, HostError> {
        info!("Running installer: {} {silent_flag}", installer.display());

        let status = Command::new(installer)
            .arg(silent_flag)
            .status()
            .await
            .map_err(|source| HostError::Spawn {
                program: installer.to_path_buf(),
                source,
            })?;

        debug!("Installer exit status: {status:?}");
        Ok(InstallerStatus::from(status))
    }
}
