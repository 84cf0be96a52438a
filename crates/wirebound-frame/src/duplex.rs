use wirebound_io::{Sink, Source};

use crate::codec::{HeaderOutcome, Outcome};
use crate::error::Result;
use crate::options::FrameOptions;
use crate::reader::FrameReader;
use crate::writer::FrameWriter;

/// A reader/writer pair over one bidirectional endpoint.
///
/// The two directions hold independent codecs, so an in-flight read can
/// never corrupt an in-flight write. This is the shape an echo server
/// wants: receive one message, send one message, repeat.
pub struct FrameDuplex<S, W> {
    reader: FrameReader<S>,
    writer: FrameWriter<W>,
}

impl<S: Source, W: Sink> FrameDuplex<S, W> {
    pub fn new(src: S, sink: W) -> Self {
        Self::with_options(src, sink, FrameOptions::default())
    }

    pub fn with_options(src: S, sink: W, opts: FrameOptions) -> Self {
        Self {
            reader: FrameReader::with_options(src, opts),
            writer: FrameWriter::with_options(sink, opts),
        }
    }

    /// See [`FrameReader::read_one`].
    pub fn read_one(&mut self, dst: &mut [u8]) -> Result<Outcome> {
        self.reader.read_one(dst)
    }

    /// See [`FrameReader::parse_header`].
    pub fn parse_header(&mut self) -> Result<HeaderOutcome> {
        self.reader.parse_header()
    }

    /// See [`FrameWriter::write_one`].
    pub fn write_one(&mut self, payload: &[u8]) -> Result<Outcome> {
        self.writer.write_one(payload)
    }

    pub fn reader(&mut self) -> &mut FrameReader<S> {
        &mut self.reader
    }

    pub fn writer(&mut self) -> &mut FrameWriter<W> {
        &mut self.writer
    }

    /// Split into the two directional halves.
    pub fn into_parts(self) -> (FrameReader<S>, FrameWriter<W>) {
        (self.reader, self.writer)
    }
}
