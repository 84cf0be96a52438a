//! Portable message framing over byte-stream and packet transports.
//!
//! On stream transports (TCP, Unix stream, pipes) every message gains a
//! compact length prefix, restoring one-message-per-operation semantics.
//! On boundary-preserving transports (datagram, seq-packet) framing is
//! pass-through. All operations are non-blocking and resumable: a
//! would-block or more-to-come signal returns partial progress, and the
//! next call on the same object continues exactly where it stopped.
//!
//! Wire format (stream mode): a 1-byte lead followed by optional
//! extended length bytes, then the payload. With `L` the payload length:
//! - `0 <= L <= 253`: lead is `L`, no extension
//! - `254 <= L <= 65535`: lead is `0xFE`, 2 extension bytes hold `L` in
//!   the configured byte order
//! - `65536 <= L <= 2^56-1`: lead is `0xFF`, 7 extension bytes hold the
//!   low 56 bits of `L` in the configured byte order
//!
//! Larger payloads are rejected with [`FrameError::TooLong`]; a
//! per-reader cap can be set with [`FrameOptions::read_limit`].
//!
//! Steady-state transfer is zero-allocation: scratch buffers are sized
//! at construction and reused for the object's lifetime, and no hot
//! path builds intermediate containers.

pub mod codec;
pub mod duplex;
pub mod error;
pub mod forward;
pub mod options;
pub mod reader;
pub mod writer;

pub use codec::{
    HeaderOutcome, Outcome, DEFAULT_SCRATCH_CAPACITY, LEAD_U16, LEAD_U56, MAX_INLINE_LEN,
    MAX_PAYLOAD_LEN,
};
pub use duplex::FrameDuplex;
pub use error::{FrameError, Result};
pub use forward::Forwarder;
pub use options::{ByteOrder, FrameOptions, Protocol, RetryPolicy, Transport};
pub use reader::FrameReader;
pub use writer::FrameWriter;
