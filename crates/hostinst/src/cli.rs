use std::path::PathBuf;

use clap::Parser;

use crate::config::RunConfig;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "hostinst",
    version,
    about = "Download and silently install the latest ASP.NET Core hosting bundle"
)]
pub struct Cli {
    /// JSON config file; defaults to config.json in the per-user config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Runtime channel to track, for example 9.0.
    #[arg(long)]
    pub channel: Option<String>,

    /// Release metadata URL; overrides the channel's default.
    #[arg(long)]
    pub metadata_url: Option<String>,

    /// Base URL the installer download path is appended to.
    #[arg(long)]
    pub download_base: Option<String>,

    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Flag passed to the installer for an unattended install.
    #[arg(long, allow_hyphen_values = true)]
    pub silent_flag: Option<String>,

    /// Select the version and report the download, without downloading.
    #[arg(long)]
    pub dry_run: bool,

    /// Stop when the selected ASP.NET Core runtime is already installed.
    #[arg(long)]
    pub skip_if_installed: bool,

    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(channel) = &self.channel {
            config.channel.clone_from(channel);
        }
        if let Some(url) = &self.metadata_url {
            config.metadata_url = Some(url.clone());
        }
        if let Some(base) = &self.download_base {
            config.download_base_url.clone_from(base);
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir.clone_from(dir);
        }
        if let Some(dir) = &self.download_dir {
            config.download_dir.clone_from(dir);
        }
        if let Some(flag) = &self.silent_flag {
            config.silent_flag.clone_from(flag);
        }
        config.dry_run |= self.dry_run;
        config.skip_if_installed |= self.skip_if_installed;
        config.debug_logging |= self.debug;
    }
}
