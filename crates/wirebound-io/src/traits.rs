/// Completion status attached to every transport call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoStatus {
    /// The call made normal progress.
    Ready,
    /// The transport reached end-of-stream. Sources may report this
    /// together with their final bytes; sinks never produce it.
    End,
    /// No further progress without waiting. Any bytes returned alongside
    /// are still real progress; the caller retries after readiness.
    WouldBlock,
    /// This completion is usable and more completions follow for the
    /// same ongoing operation. Not end-of-stream and not "try later".
    More,
}

/// A byte source with one non-blocking read operation.
pub trait Source {
    /// Read into the front of `buf`, returning the byte count and a
    /// status. Implementations must not return `(0, Ready)` for a
    /// non-empty `buf`; the framing layer treats that as a broken
    /// transport.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<(usize, IoStatus)>;
}

/// A byte sink with one non-blocking write operation.
pub trait Sink {
    /// Write from the front of `buf`, returning the count of bytes the
    /// sink accepted and a status.
    fn write(&mut self, buf: &[u8]) -> std::io::Result<(usize, IoStatus)>;
}

impl<S: Source + ?Sized> Source for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<(usize, IoStatus)> {
        (**self).read(buf)
    }
}

impl<W: Sink + ?Sized> Sink for &mut W {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<(usize, IoStatus)> {
        (**self).write(buf)
    }
}
