use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to launch {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("installer exited with code {code}")]
    InstallerFailed { code: i32 },

    #[error("installer was terminated before reporting an exit code")]
    Terminated,
}
