//! Non-blocking transport contract consumed by the framing layer.
//!
//! A [`Source`] exposes a single non-blocking read and a [`Sink`] a single
//! non-blocking write. Every call returns the bytes moved plus an
//! [`IoStatus`] qualifying the result, so a transport can report partial
//! progress together with "come back later" (would-block), "more
//! completions follow" (more), or end-of-stream — including the
//! `(n > 0, end-of-stream)` combination some transports produce on their
//! final read.
//!
//! This is the lowest layer of wirebound. The framing layer builds on
//! these two traits and nothing else; [`adapt`] bridges any blocking or
//! non-blocking `std::io` stream into the contract.

pub mod adapt;
pub mod traits;

pub use adapt::{StreamSink, StreamSource};
pub use traits::{IoStatus, Sink, Source};
