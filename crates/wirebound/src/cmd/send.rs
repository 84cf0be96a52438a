use std::fs;
use std::io::Read;

use tracing::info;
use wirebound_frame::{FrameWriter, Outcome};
use wirebound_io::StreamSink;

use crate::cmd::{frame_options, SendArgs};
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::net::Endpoint;

pub fn run(args: SendArgs) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;

    let endpoint = Endpoint::from_addr(&args.addr, args.unix);
    let conn = endpoint
        .connect()
        .map_err(|err| io_error("connect failed", err))?;

    let opts = frame_options(args.byte_order, 0);
    let mut writer = FrameWriter::with_options(StreamSink::new(conn), opts);

    match writer
        .write_one(&payload)
        .map_err(|err| frame_error("send failed", err))?
    {
        Outcome::Done(n) => {
            info!(bytes = n, endpoint = %endpoint, "message sent");
            Ok(SUCCESS)
        }
        other => Err(crate::exit::CliError::new(
            crate::exit::FAILURE,
            format!("send interrupted: {other:?}"),
        )),
    }
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    let mut payload = Vec::new();
    std::io::stdin()
        .read_to_end(&mut payload)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::OrderArg;

    fn args_with_data(data: &str) -> SendArgs {
        SendArgs {
            addr: "127.0.0.1:0".to_string(),
            unix: false,
            data: Some(data.to_string()),
            file: None,
            byte_order: OrderArg::Big,
        }
    }

    #[test]
    fn inline_data_becomes_payload() {
        let payload = resolve_payload(&args_with_data("hi there")).unwrap();
        assert_eq!(payload, b"hi there");
    }

    #[test]
    fn file_payload_is_read() {
        let path = std::env::temp_dir().join(format!("wirebound-send-{}", std::process::id()));
        fs::write(&path, b"file-bytes").unwrap();

        let mut args = args_with_data("");
        args.data = None;
        args.file = Some(path.clone());
        let payload = resolve_payload(&args).unwrap();
        assert_eq!(payload, b"file-bytes");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_maps_to_cli_error() {
        let mut args = args_with_data("");
        args.data = None;
        args.file = Some("/nonexistent/wirebound-payload".into());
        assert!(resolve_payload(&args).is_err());
    }
}
