use bytes::BytesMut;
use wirebound_io::{IoStatus, Sink, Source};

use crate::codec::{read_once, Codec, Outcome, FILL_CHUNK_CAPACITY};
use crate::error::{FrameError, Result};
use crate::options::FrameOptions;

/// Writes exactly one framed message per [`write_one`](FrameWriter::write_one)
/// call.
///
/// In stream mode the payload gains a length prefix; in packet modes
/// writes pass through unchanged. A write interrupted by would-block is
/// resumed by calling again with the same payload — the header is built
/// once and never re-emitted.
pub struct FrameWriter<W> {
    sink: W,
    codec: Codec,
    /// Chunk staging buffer for [`fill_from`](FrameWriter::fill_from),
    /// sized once at construction.
    scratch: BytesMut,
    /// Length of a chunk resident in `scratch` whose framed write was
    /// interrupted; the next `fill_from` call finishes it before pulling
    /// more data from the source.
    pending: Option<usize>,
}

impl<W: Sink> FrameWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, FrameOptions::default())
    }

    pub fn with_options(sink: W, opts: FrameOptions) -> Self {
        let mut scratch = BytesMut::with_capacity(FILL_CHUNK_CAPACITY);
        scratch.resize(FILL_CHUNK_CAPACITY, 0);
        Self {
            sink,
            codec: Codec::new(opts),
            scratch,
            pending: None,
        }
    }

    /// Emit `payload` as one message.
    ///
    /// Stream mode: the reported count covers payload bytes only; header
    /// bytes are invisible to the caller. On a resumed call the payload
    /// must have the same length as the first attempt.
    pub fn write_one(&mut self, payload: &[u8]) -> Result<Outcome> {
        if self.codec.options().write_protocol.preserves_boundary() {
            self.codec.write_packet(&mut self.sink, payload)
        } else {
            self.codec.write_message(&mut self.sink, payload)
        }
    }

    /// Pull chunks from `source` and emit each as one framed message
    /// until the source is exhausted or a semantic signal interrupts.
    ///
    /// This is a chunking path: source message boundaries are not
    /// preserved; each successful source read becomes one frame. The
    /// returned count totals the payload bytes written during this call.
    pub fn fill_from<S: Source>(&mut self, source: &mut S) -> Result<Outcome> {
        let retry = self.codec.options().retry;
        let mut total = 0usize;

        // A chunk staged by a previous call is finished first.
        if let Some(len) = self.pending {
            if let Some(outcome) = self.write_chunk(len, &mut total)? {
                return Ok(outcome);
            }
        } else if let Some(length) = self.codec.pending_write_len() {
            // A direct write_one is mid-frame; its payload bytes are not
            // ours to replay.
            return Err(FrameError::ShortBuffer { needed: length });
        }

        loop {
            let (n, status) = read_once(source, retry, &mut self.scratch[..])?;
            if n > 0 {
                if let Some(outcome) = self.write_chunk(n, &mut total)? {
                    return Ok(outcome);
                }
            }
            match status {
                IoStatus::Ready => {}
                IoStatus::End => return Ok(Outcome::Done(total)),
                IoStatus::WouldBlock => return Ok(Outcome::WouldBlock(total)),
                IoStatus::More => return Ok(Outcome::More(total)),
            }
        }
    }

    /// Frame and emit `scratch[..len]`, remembering it as pending when
    /// the sink interrupts. Returns the outcome to surface, if any.
    fn write_chunk(&mut self, len: usize, total: &mut usize) -> Result<Option<Outcome>> {
        let outcome = if self.codec.options().write_protocol.preserves_boundary() {
            self.codec.write_packet(&mut self.sink, &self.scratch[..len])
        } else {
            self.codec.write_message(&mut self.sink, &self.scratch[..len])
        }?;
        *total += outcome.bytes();
        match outcome {
            Outcome::Done(_) => {
                self.pending = None;
                Ok(None)
            }
            Outcome::WouldBlock(_) => {
                self.pending = Some(len);
                Ok(Some(Outcome::WouldBlock(*total)))
            }
            Outcome::More(_) => {
                self.pending = Some(len);
                Ok(Some(Outcome::More(*total)))
            }
            Outcome::End => Err(FrameError::ShortWrite),
        }
    }

    pub fn options(&self) -> &FrameOptions {
        self.codec.options()
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Consume the writer and return the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}
