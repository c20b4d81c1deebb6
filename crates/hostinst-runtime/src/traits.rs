use std::path::Path;

use async_trait::async_trait;

use crate::error::HostError;

/// Output of the runtime-listing command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeListing {
    pub text: String,
    pub available: bool,
}

impl RuntimeListing {
    #[must_use]
    pub fn available(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            available: true,
        }
    }

    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// True when the command ran but listed nothing, or could not run at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.available || self.text.trim().is_empty()
    }
}

/// Exit status of an installer process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallerStatus {
    pub code: Option<i32>,
}

impl InstallerStatus {
    #[must_use]
    pub fn success(self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero or missing exit code into an error.
    ///
    /// # Errors
    /// Returns [`HostError::InstallerFailed`] for a non-zero code and
    /// [`HostError::Terminated`] when the process reported no code.
    pub fn check(self) -> Result<(), HostError> {
        match self.code {
            Some(0) => Ok(()),
            Some(code) => Err(HostError::InstallerFailed { code }),
            None => Err(HostError::Terminated),
        }
    }
}

impl From<std::process::ExitStatus> for InstallerStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Process-level collaborator of the install pipeline.
#[async_trait]
pub trait RuntimeHost: Send + Sync {
    /// Runs the runtime-listing command. Failures are reported through
    /// [`RuntimeListing::available`], never as errors.
    async fn list_installed_runtimes(&self) -> RuntimeListing;

    /// Runs `installer` with `silent_flag` and waits for it to exit.
    async fn run_installer(
        &self,
        installer: &Path,
        silent_flag: &str,
    ) -> Result<InstallerStatus, HostError>;
}
