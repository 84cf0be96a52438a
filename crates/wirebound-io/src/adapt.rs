use std::io::{ErrorKind, Read, Write};

use crate::traits::{IoStatus, Sink, Source};

/// Adapts any [`std::io::Read`] into a [`Source`].
///
/// `Ok(0)` on a non-empty buffer maps to [`IoStatus::End`],
/// `ErrorKind::WouldBlock` to [`IoStatus::WouldBlock`], and interrupted
/// calls are retried. Other errors pass through unchanged.
pub struct StreamSource<R> {
    inner: R,
}

impl<R> StreamSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the adapter and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Source for StreamSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<(usize, IoStatus)> {
        if buf.is_empty() {
            return Ok((0, IoStatus::Ready));
        }
        loop {
            match self.inner.read(buf) {
                Ok(0) => return Ok((0, IoStatus::End)),
                Ok(n) => return Ok((n, IoStatus::Ready)),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    return Ok((0, IoStatus::WouldBlock))
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Adapts any [`std::io::Write`] into a [`Sink`].
pub struct StreamSink<W> {
    inner: W,
}

impl<W> StreamSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the adapter and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<(usize, IoStatus)> {
        if buf.is_empty() {
            return Ok((0, IoStatus::Ready));
        }
        loop {
            match self.inner.write(buf) {
                Ok(n) => return Ok((n, IoStatus::Ready)),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    return Ok((0, IoStatus::WouldBlock))
                }
                Err(err) => return Err(err),
            }
        }
    }
}
