//! Message framing for byte-stream and packet transports.
//!
//! wirebound restores one-message-per-operation semantics on top of
//! stream transports (TCP, Unix stream, pipes) with a compact length
//! prefix, and passes boundary-preserving transports (datagram,
//! seq-packet) through unchanged.
//!
//! # Crate structure
//!
//! - [`io`] — Non-blocking source/sink transport contract and `std::io`
//!   adapters
//! - [`frame`] — Framing codec, reader/writer surfaces, bulk-copy fast
//!   paths, and the boundary-preserving forwarder

/// Re-export transport contract types.
pub mod io {
    pub use wirebound_io::*;
}

/// Re-export framing types.
pub mod frame {
    pub use wirebound_frame::*;
}
