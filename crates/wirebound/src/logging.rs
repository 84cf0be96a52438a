use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

/// Diagnostic verbosity for the stderr log stream.
///
/// Four tiers are enough for this tool: operators mostly want `normal`
/// (connection lifecycle) or `verbose` (per-message relay events).
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    /// Connection lifecycle and summaries.
    Normal,
    /// Per-message events.
    Verbose,
    /// Everything, including transport-level detail.
    Trace,
}

impl Verbosity {
    fn filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::WARN,
            Verbosity::Normal => LevelFilter::INFO,
            Verbosity::Verbose => LevelFilter::DEBUG,
            Verbosity::Trace => LevelFilter::TRACE,
        }
    }
}

/// Log line style on stderr.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogStyle {
    /// Single-line human-readable text.
    Text,
    /// One JSON object per event.
    Json,
}

/// Install the global stderr subscriber.
///
/// Logs never touch stdout; that stream is reserved for message
/// payloads (`--format raw`) and structured output.
pub fn init(style: LogStyle, verbosity: Verbosity) {
    let base = tracing_subscriber::fmt()
        .with_max_level(verbosity.filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false);

    match style {
        LogStyle::Json => {
            let _ = base.json().try_init();
        }
        LogStyle::Text => {
            let _ = base.try_init();
        }
    }
}
