use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, warn};

use hostinst::cli::Cli;
use hostinst::logging::{init_logging, set_verbose};
use hostinst::{RunConfig, Transcript, TranscriptSink, prune_old_transcripts};
use hostinst_runtime::DotnetHost;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let sink = TranscriptSink::detached();
    init_logging(sink.clone());
    set_verbose(cli.debug);

    let mut config = match RunConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);
    set_verbose(config.debug_logging);

    let transcript = match Transcript::start(&config.log_dir, sink) {
        Ok(transcript) => transcript,
        Err(err) => {
            error!(
                "Failed to start transcript in {}: {err}",
                config.log_dir.display()
            );
            return ExitCode::FAILURE;
        }
    };

    match prune_old_transcripts(&config.log_dir, config.max_log_files) {
        Ok(0) => {}
        Ok(removed) => debug!("Removed {removed} old transcripts"),
        Err(err) => debug!("Could not prune old transcripts: {err}"),
    }

    if !cfg!(windows) {
        warn!("Hosting bundle installers only run on Windows; the install step will fail here");
    }

    let host = DotnetHost::new(&config.runtime_list_command, &config.runtime_list_arg);
    let report = hostinst::run(&config, &host, transcript).await;

    if report.outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
