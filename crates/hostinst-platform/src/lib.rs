//! Host platform helpers for hostinst.
//!
//! - Per-user directory layout for transcripts, downloads and configuration.
//! - Console-window suppression for spawned child processes.

mod paths;
mod process;

pub use paths::{AppPaths, AppPathsError};
pub use process::NoConsoleWindow;
