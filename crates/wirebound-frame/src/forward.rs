use bytes::BytesMut;
use wirebound_io::{Sink, Source};

use crate::codec::{scratch_capacity, Codec, HeaderOutcome, Origin, Outcome};
use crate::error::{FrameError, Result};
use crate::options::FrameOptions;

/// Per-message relay progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ForwardPhase {
    /// Learn the next message's length (stream mode) or start a packet
    /// read.
    ParseHeader,
    /// Fill the payload buffer.
    ReadPayload { eof_after: bool },
    /// Emit the buffered payload as one framed message.
    WriteFrame { eof_after: bool },
    /// The final message has been forwarded; only end-of-stream remains.
    Drained,
}

/// Relays framed messages from a source to a destination while
/// preserving message boundaries.
///
/// One [`forward_once`](Forwarder::forward_once) call processes at most
/// one message: parse its header, read the whole payload into the
/// internal buffer, then emit it as exactly one framed message. Each
/// step may return early with partial progress and a would-block or
/// more outcome; retrying on the same instance resumes the in-flight
/// message, never restarts it.
///
/// The payload buffer is allocated once at construction, sized by the
/// read limit (or 64 KiB when unlimited). Messages that exceed the
/// buffer yield [`FrameError::ShortBuffer`]; messages that exceed the
/// read limit yield [`FrameError::TooLong`]. Steady-state forwarding
/// does not allocate.
pub struct Forwarder<S, W> {
    src: S,
    dst: W,
    /// Read-side and write-side codecs advance in lock step per message.
    rd: Codec,
    wr: Codec,
    buf: BytesMut,
    /// Payload length of the message in flight.
    need: usize,
    /// Bytes of it read into `buf` so far.
    got: usize,
    phase: ForwardPhase,
}

impl<S: Source, W: Sink> Forwarder<S, W> {
    pub fn new(dst: W, src: S) -> Self {
        Self::with_options(dst, src, FrameOptions::default())
    }

    pub fn with_options(dst: W, src: S, opts: FrameOptions) -> Self {
        let cap = scratch_capacity(opts.read_limit);
        let mut buf = BytesMut::with_capacity(cap);
        buf.resize(cap, 0);
        Self {
            src,
            dst,
            rd: Codec::new(opts),
            wr: Codec::new(opts),
            buf,
            need: 0,
            got: 0,
            phase: ForwardPhase::ParseHeader,
        }
    }

    /// Forward at most one message.
    ///
    /// The returned count reflects progress in the phase that ran last:
    /// payload bytes read into the buffer during the read phase, or
    /// payload bytes written to the destination during the write phase.
    pub fn forward_once(&mut self) -> Result<Outcome> {
        if self.phase == ForwardPhase::Drained {
            return Ok(Outcome::End);
        }

        if self.phase == ForwardPhase::ParseHeader {
            if self.rd.options().read_protocol.preserves_boundary() {
                // Packet size is unknown upfront; read straight into the
                // buffer, bounded by capacity and the read limit.
                self.need = 0;
                self.got = 0;
                self.phase = ForwardPhase::ReadPayload { eof_after: false };
            } else {
                match self.rd.parse_header(&mut self.src)? {
                    HeaderOutcome::Parsed(length) => {
                        if length > self.buf.len() as u64 {
                            return Err(FrameError::ShortBuffer { needed: length });
                        }
                        self.need = length as usize;
                        self.got = 0;
                        self.phase = ForwardPhase::ReadPayload { eof_after: false };
                    }
                    HeaderOutcome::End => return Ok(Outcome::End),
                    HeaderOutcome::WouldBlock => return Ok(Outcome::WouldBlock(0)),
                    HeaderOutcome::More => return Ok(Outcome::More(0)),
                }
            }
        }

        if let ForwardPhase::ReadPayload { eof_after } = self.phase {
            if self.rd.options().read_protocol.preserves_boundary() {
                let limit = self.rd.options().read_limit;
                let max = if limit > 0 {
                    (self.buf.len() as u64).min(limit) as usize
                } else {
                    self.buf.len()
                };
                match self.rd.read_packet(&mut self.src, &mut self.buf[self.got..max])? {
                    Outcome::Done(n) => {
                        self.got += n;
                        let eof_after = eof_after || self.rd.is_drained();
                        self.need = self.got;
                        self.phase = ForwardPhase::WriteFrame { eof_after };
                    }
                    Outcome::WouldBlock(n) => {
                        self.got += n;
                        return Ok(Outcome::WouldBlock(n));
                    }
                    Outcome::More(n) => {
                        self.got += n;
                        return Ok(Outcome::More(n));
                    }
                    Outcome::End => {
                        if self.got == 0 {
                            return Ok(Outcome::End);
                        }
                        // Bytes accumulated before the stream ended form
                        // the final packet.
                        self.need = self.got;
                        self.phase = ForwardPhase::WriteFrame { eof_after: true };
                    }
                }
            } else {
                // The codec tracks placement; the destination slice is
                // the full payload range on every call.
                match self
                    .rd
                    .read_payload(&mut self.src, &mut self.buf[..self.need], Origin::Scratch)?
                {
                    Outcome::Done(_) => {
                        self.got = self.need;
                        self.phase = ForwardPhase::WriteFrame { eof_after };
                    }
                    Outcome::WouldBlock(n) => {
                        self.got += n;
                        return Ok(Outcome::WouldBlock(n));
                    }
                    Outcome::More(n) => {
                        self.got += n;
                        return Ok(Outcome::More(n));
                    }
                    Outcome::End => return Err(FrameError::UnexpectedEof),
                }
            }
        }

        if let ForwardPhase::WriteFrame { eof_after } = self.phase {
            let outcome = if self.wr.options().write_protocol.preserves_boundary() {
                self.wr.write_packet(&mut self.dst, &self.buf[..self.need])
            } else {
                self.wr.write_message(&mut self.dst, &self.buf[..self.need])
            }?;
            return match outcome {
                Outcome::Done(n) => {
                    self.need = 0;
                    self.got = 0;
                    self.phase = if eof_after {
                        ForwardPhase::Drained
                    } else {
                        ForwardPhase::ParseHeader
                    };
                    Ok(Outcome::Done(n))
                }
                Outcome::WouldBlock(n) => Ok(Outcome::WouldBlock(n)),
                Outcome::More(n) => Ok(Outcome::More(n)),
                Outcome::End => Err(FrameError::ShortWrite),
            };
        }

        Ok(Outcome::Done(0))
    }

    pub fn options(&self) -> &FrameOptions {
        self.rd.options()
    }

    /// Consume the forwarder and return its endpoints.
    pub fn into_parts(self) -> (W, S) {
        (self.dst, self.src)
    }
}
