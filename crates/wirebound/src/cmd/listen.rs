use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};
use wirebound_frame::{FrameError, FrameReader, Outcome, DEFAULT_SCRATCH_CAPACITY};
use wirebound_io::StreamSource;

use crate::cmd::{frame_options, ListenArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS};
use crate::net::Endpoint;
use crate::output::{print_message, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let endpoint = Endpoint::from_addr(&args.addr, args.unix);
    let acceptor = endpoint.bind().map_err(|err| io_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let opts = frame_options(args.byte_order, args.limit);
    let mut printed = 0u64;

    while running.load(Ordering::SeqCst) {
        let conn = match acceptor.accept() {
            Ok(conn) => conn,
            Err(err) => return Err(io_error("accept failed", err)),
        };
        let peer = conn.peer_name();
        info!(%peer, "connection accepted");

        let mut reader = FrameReader::with_options(StreamSource::new(conn), opts);
        let mut buf = vec![0u8; initial_buffer_size(args.limit)];

        while running.load(Ordering::SeqCst) {
            match reader.read_one(&mut buf) {
                Ok(Outcome::Done(n)) => {
                    printed += 1;
                    print_message(printed, &buf[..n], &peer, format);
                    if args.count.is_some_and(|count| printed >= count) {
                        return Ok(SUCCESS);
                    }
                }
                Ok(Outcome::End) => break,
                Ok(other) => {
                    // Blocking sockets with a yield retry should never
                    // surface a semantic signal here.
                    warn!(outcome = ?other, "unexpected partial read");
                }
                Err(FrameError::ShortBuffer { needed }) => {
                    buf.resize(needed as usize, 0);
                }
                Err(FrameError::UnexpectedEof) => {
                    warn!(%peer, "connection truncated mid-frame");
                    break;
                }
                Err(err) => return Err(frame_error("receive failed", err)),
            }
        }
        info!(%peer, "connection closed");
    }

    Ok(SUCCESS)
}

fn initial_buffer_size(limit: u64) -> usize {
    if limit == 0 {
        DEFAULT_SCRATCH_CAPACITY
    } else {
        usize::try_from(limit).unwrap_or(DEFAULT_SCRATCH_CAPACITY)
    }
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
