mod cmd;
mod exit;
mod logging;
mod net;
mod output;

use clap::{Args, Parser};

use crate::cmd::Command;
use crate::logging::{LogStyle, Verbosity};
use crate::output::OutputFormat;

/// Flags recognized by every subcommand.
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Diagnostic verbosity on stderr.
    #[arg(long, value_name = "LEVEL", default_value = "normal", global = true)]
    verbosity: Verbosity,

    /// Log line style on stderr.
    #[arg(long, value_name = "STYLE", default_value = "text", global = true)]
    log_style: LogStyle,

    /// Output format for received messages. Defaults to a table on a
    /// terminal and JSON otherwise.
    #[arg(long, short = 'f', value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,
}

#[derive(Parser, Debug)]
#[command(
    name = "wirebound",
    version,
    about = "Frame, receive, and relay length-prefixed messages"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    globals: GlobalOpts,
}

fn main() {
    std::process::exit(run(Cli::parse()));
}

fn run(cli: Cli) -> i32 {
    logging::init(cli.globals.log_style, cli.globals.verbosity);

    let format = cli
        .globals
        .format
        .unwrap_or_else(OutputFormat::default_for_stdout);

    match cmd::run(cli.command, format) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("wirebound: {err}");
            err.code
        }
    }
}
