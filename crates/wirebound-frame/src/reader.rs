use bytes::BytesMut;
use wirebound_io::{IoStatus, Sink, Source};

use crate::codec::{scratch_capacity, write_once, Codec, HeaderOutcome, Origin, Outcome};
use crate::error::{FrameError, Result};
use crate::options::FrameOptions;

const PACKET_COPY_CHUNK: usize = 32 * 1024;

/// Reads one whole message per [`read_one`](FrameReader::read_one) call.
///
/// In stream mode the length prefix is decoded and stripped; in packet
/// modes reads pass through unchanged. All progress state lives in this
/// object, so partial reads interrupted by would-block resume exactly
/// where they stopped — including across a mix of `read_one` and
/// [`drain_to`](FrameReader::drain_to) calls, up to the documented
/// mid-payload restriction.
pub struct FrameReader<S> {
    src: S,
    codec: Codec,
    /// Bulk-copy scratch, sized once at construction so the steady state
    /// never allocates.
    scratch: BytesMut,
    /// Range of `scratch` read from the source but not yet accepted by
    /// the destination of an interrupted `drain_to`.
    unsent_start: usize,
    unsent_end: usize,
}

impl<S: Source> FrameReader<S> {
    pub fn new(src: S) -> Self {
        Self::with_options(src, FrameOptions::default())
    }

    pub fn with_options(src: S, opts: FrameOptions) -> Self {
        let cap = if opts.read_protocol.preserves_boundary() {
            0
        } else {
            scratch_capacity(opts.read_limit)
        };
        let mut scratch = BytesMut::with_capacity(cap);
        scratch.resize(cap, 0);
        Self {
            src,
            codec: Codec::new(opts),
            scratch,
            unsent_start: 0,
            unsent_end: 0,
        }
    }

    /// Read one message into `dst`.
    ///
    /// Stream mode: delivers one whole payload, or a resumable outcome.
    /// After a partial payload read the caller must retry with a buffer
    /// of the same required size; the placement cursor is held here, not
    /// derived from the buffer. Packet mode: one transport read, with
    /// the read limit applied to the returned count.
    pub fn read_one(&mut self, dst: &mut [u8]) -> Result<Outcome> {
        if self.codec.options().read_protocol.preserves_boundary() {
            self.codec.read_packet(&mut self.src, dst)
        } else {
            self.codec.read_message(&mut self.src, dst)
        }
    }

    /// Drive header parsing without consuming payload bytes (stream mode
    /// only).
    ///
    /// Once this returns [`HeaderOutcome::Parsed`], the length is fixed
    /// and a subsequent [`read_one`](Self::read_one) with a large enough
    /// buffer delivers the payload. Useful for sizing buffers before
    /// committing to a read.
    pub fn parse_header(&mut self) -> Result<HeaderOutcome> {
        if self.codec.options().read_protocol.preserves_boundary() {
            return Err(FrameError::InvalidState);
        }
        self.codec.parse_header(&mut self.src)
    }

    /// Copy messages into `sink` until the source is exhausted or a
    /// semantic signal interrupts.
    ///
    /// This is a chunking path: payload bytes are written as-is, without
    /// re-framing, one message at a time through the internal scratch.
    /// The returned count is the bytes accepted by the sink during this
    /// call. A partially-accepted message is finished first on the next
    /// call, before any new message is read.
    pub fn drain_to<W: Sink>(&mut self, sink: &mut W) -> Result<Outcome> {
        if self.codec.options().read_protocol.preserves_boundary() {
            self.drain_packets(sink)
        } else {
            self.drain_stream(sink)
        }
    }

    fn drain_stream<W: Sink>(&mut self, sink: &mut W) -> Result<Outcome> {
        let mut total = 0usize;
        loop {
            // Deliver what the sink refused last time before reading on.
            if let Some(outcome) = self.flush_unsent(sink, &mut total)? {
                return Ok(outcome);
            }

            let len = if self.codec.pending_scratch_payload() {
                self.codec.length() as usize
            } else {
                match self.codec.parse_header(&mut self.src)? {
                    HeaderOutcome::Parsed(length) => {
                        if length > self.scratch.len() as u64 {
                            // No caller buffer is involved, so an
                            // oversized message is a limit violation,
                            // not a short buffer.
                            return Err(FrameError::TooLong {
                                length,
                                limit: self.scratch.len() as u64,
                            });
                        }
                        length as usize
                    }
                    HeaderOutcome::End => return Ok(Outcome::Done(total)),
                    HeaderOutcome::WouldBlock => return Ok(Outcome::WouldBlock(total)),
                    HeaderOutcome::More => return Ok(Outcome::More(total)),
                }
            };

            match self
                .codec
                .read_payload(&mut self.src, &mut self.scratch[..len], Origin::Scratch)?
            {
                Outcome::Done(_) => {
                    self.unsent_start = 0;
                    self.unsent_end = len;
                }
                Outcome::WouldBlock(_) => return Ok(Outcome::WouldBlock(total)),
                Outcome::More(_) => return Ok(Outcome::More(total)),
                Outcome::End => return Err(FrameError::UnexpectedEof),
            }
            // Zero-length messages set an empty range; the next flush is
            // a no-op and the loop advances to the next header.
        }
    }

    fn flush_unsent<W: Sink>(&mut self, sink: &mut W, total: &mut usize) -> Result<Option<Outcome>> {
        let retry = self.codec.options().retry;
        while self.unsent_start < self.unsent_end {
            let (n, status) = write_once(
                sink,
                retry,
                &self.scratch[self.unsent_start..self.unsent_end],
            )?;
            self.unsent_start += n;
            *total += n;
            match status {
                IoStatus::Ready => {}
                IoStatus::WouldBlock => return Ok(Some(Outcome::WouldBlock(*total))),
                IoStatus::More => return Ok(Some(Outcome::More(*total))),
                IoStatus::End => return Err(FrameError::ShortWrite),
            }
        }
        self.unsent_start = 0;
        self.unsent_end = 0;
        Ok(None)
    }

    fn drain_packets<W: Sink>(&mut self, sink: &mut W) -> Result<Outcome> {
        let retry = self.codec.options().retry;
        let mut total = 0usize;
        let mut buf = [0u8; PACKET_COPY_CHUNK];
        loop {
            let outcome = self.codec.read_packet(&mut self.src, &mut buf)?;
            let n = outcome.bytes();
            let mut off = 0usize;
            while off < n {
                let (wn, status) = write_once(sink, retry, &buf[off..n])?;
                off += wn;
                total += wn;
                match status {
                    IoStatus::Ready => {}
                    IoStatus::WouldBlock => return Ok(Outcome::WouldBlock(total)),
                    IoStatus::More => return Ok(Outcome::More(total)),
                    IoStatus::End => return Err(FrameError::ShortWrite),
                }
            }
            match outcome {
                Outcome::Done(_) => {}
                Outcome::End => return Ok(Outcome::Done(total)),
                Outcome::WouldBlock(_) => return Ok(Outcome::WouldBlock(total)),
                Outcome::More(_) => return Ok(Outcome::More(total)),
            }
        }
    }

    pub fn options(&self) -> &FrameOptions {
        self.codec.options()
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.src
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.src
    }

    /// Consume the reader and return the source.
    pub fn into_inner(self) -> S {
        self.src
    }
}
