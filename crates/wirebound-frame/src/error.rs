/// Errors produced by framing operations.
///
/// Would-block and more-to-come are not represented here; they are
/// control-flow variants of [`crate::Outcome`] so callers distinguish
/// "retry later" from a hard failure by matching, never by inspecting
/// error contents.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream ended inside an incomplete header or payload.
    #[error("stream truncated inside a frame")]
    UnexpectedEof,

    /// The destination cannot hold the parsed payload. The caller may
    /// retry the same message with a buffer of at least `needed` bytes.
    #[error("buffer too small for {needed}-byte payload")]
    ShortBuffer { needed: u64 },

    /// The sink accepted fewer bytes than offered without reporting an
    /// error, or a resumed write presented a different message.
    #[error("short write")]
    ShortWrite,

    /// The transport returned neither bytes nor a status change on a
    /// non-empty buffer. Fatal; the transport is broken.
    #[error("transport made no progress")]
    NoProgress,

    /// A payload length exceeds the configured limit or the wire-format
    /// ceiling.
    #[error("payload length {length} exceeds limit {limit}")]
    TooLong { length: u64, limit: u64 },

    /// The requested entry point conflicts with the frame currently in
    /// flight through a different entry point.
    #[error("operation conflicts with an in-flight frame")]
    InvalidState,

    /// An error reported by the underlying transport, passed through
    /// unchanged.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
