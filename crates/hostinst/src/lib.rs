//! Installs the newest ASP.NET Core hosting bundle for a runtime channel.
//!
//! The binary wires these pieces together; they are exposed as a library so
//! the pipeline can be driven with a fake [`hostinst_runtime::RuntimeHost`].

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod transcript;

pub use config::{ConfigError, RunConfig};
pub use error::RunError;
pub use pipeline::{Inventories, RunOutcome, RunReport, run};
pub use transcript::{Transcript, TranscriptSink, prune_old_transcripts};
