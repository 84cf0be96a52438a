use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use wirebound_frame::{ByteOrder, FrameOptions, RetryPolicy};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod forward;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one framed message to an endpoint.
    Send(SendArgs),
    /// Listen and print received messages.
    Listen(ListenArgs),
    /// Relay framed messages between two endpoints.
    Forward(ForwardArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args),
        Command::Listen(args) => listen::run(args, format),
        Command::Forward(args) => forward::run(args),
        Command::Version(args) => version::run(args),
    }
}

/// Byte order selector shared by the framing subcommands.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum OrderArg {
    Big,
    Little,
    Native,
}

impl OrderArg {
    pub fn resolve(self) -> ByteOrder {
        match self {
            OrderArg::Big => ByteOrder::Big,
            OrderArg::Little => ByteOrder::Little,
            OrderArg::Native => ByteOrder::native(),
        }
    }
}

/// Build framing options for the CLI: blocking sockets underneath, so
/// transient would-block signals are retried with a cooperative yield.
pub fn frame_options(order: OrderArg, limit: u64) -> FrameOptions {
    FrameOptions::new()
        .byte_order(order.resolve())
        .read_limit(limit)
        .retry(RetryPolicy::Yield)
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Endpoint address: host:port, or a socket path with --unix.
    pub addr: String,
    /// Treat the address as a Unix stream socket path.
    #[arg(long)]
    pub unix: bool,
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read the payload from a file. Defaults to stdin when neither
    /// --data nor --file is given.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Length-prefix byte order.
    #[arg(long, value_name = "ORDER", default_value = "big")]
    pub byte_order: OrderArg,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Endpoint address: host:port, or a socket path with --unix.
    pub addr: String,
    /// Treat the address as a Unix stream socket path.
    #[arg(long)]
    pub unix: bool,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<u64>,
    /// Maximum accepted payload size in bytes (0 = unlimited).
    #[arg(long, default_value = "0")]
    pub limit: u64,
    /// Length-prefix byte order.
    #[arg(long, value_name = "ORDER", default_value = "big")]
    pub byte_order: OrderArg,
}

#[derive(Args, Debug)]
pub struct ForwardArgs {
    /// Endpoint to accept the source connection on.
    pub from: String,
    /// Endpoint to relay messages to.
    pub to: String,
    /// Treat the source address as a Unix stream socket path.
    #[arg(long)]
    pub unix_from: bool,
    /// Treat the destination address as a Unix stream socket path.
    #[arg(long)]
    pub unix_to: bool,
    /// Maximum accepted payload size in bytes (0 = unlimited; also sizes
    /// the relay buffer).
    #[arg(long, default_value = "0")]
    pub limit: u64,
    /// Length-prefix byte order.
    #[arg(long, value_name = "ORDER", default_value = "big")]
    pub byte_order: OrderArg,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
