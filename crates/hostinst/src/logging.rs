use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger,
};

use crate::transcript::TranscriptSink;

/// Install the terminal logger and the transcript logger. Both accept every
/// level; [`set_verbose`] picks what actually gets through.
pub fn init_logging(sink: TranscriptSink) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("hostinst")
        .build();

    let term_logger = TermLogger::new(
        LevelFilter::Debug,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
    let file_logger = WriteLogger::new(LevelFilter::Debug, config, sink);

    let _ = CombinedLogger::init(vec![term_logger, file_logger]);
    set_verbose(false);
}

pub fn set_verbose(verbose: bool) {
    if verbose {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }
}
