use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};
use wirebound_frame::{Forwarder, Outcome};
use wirebound_io::{StreamSink, StreamSource};

use crate::cmd::{frame_options, ForwardArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS};
use crate::net::Endpoint;

pub fn run(args: ForwardArgs) -> CliResult<i32> {
    let from = Endpoint::from_addr(&args.from, args.unix_from);
    let to = Endpoint::from_addr(&args.to, args.unix_to);

    let acceptor = from.bind().map_err(|err| io_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let source = acceptor
        .accept()
        .map_err(|err| io_error("accept failed", err))?;
    info!(source = %source.peer_name(), "source connected");

    let dest = to.connect().map_err(|err| io_error("connect failed", err))?;
    info!(destination = %to, "destination connected");

    let opts = frame_options(args.byte_order, args.limit);
    let mut fwd = Forwarder::with_options(
        StreamSink::new(dest),
        StreamSource::new(source),
        opts,
    );

    let mut messages = 0u64;
    let mut bytes = 0u64;
    while running.load(Ordering::SeqCst) {
        match fwd.forward_once() {
            Ok(Outcome::Done(n)) => {
                messages += 1;
                bytes += n as u64;
                debug!(seq = messages, size = n, "message relayed");
            }
            Ok(Outcome::End) => break,
            Ok(_) => {
                // Blocking endpoints with a yield retry keep partial
                // progress internal; just drive the next step.
            }
            Err(err) => return Err(frame_error("relay failed", err)),
        }
    }

    info!(messages, bytes, "relay finished");
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
