//! The writer-sink trait consumed by [`crate::Reader::write_item`] and
//! [`crate::Reader::write_element`], and a couple of concrete realizations.

use std::io::Write;

/// External collaborator that the convenience write routines append item
/// bytes to.
///
/// `channel` is passed through unchanged from the caller of `write_item`/
/// `write_element`; its interpretation is entirely up to the sink.
pub trait Sink {
    /// Appends `data` to the output designated by `channel`.
    fn write(&mut self, data: &[u8], channel: usize);
}

/// Wraps any [`Write`] implementor as a single-channel [`Sink`]; `channel`
/// is ignored.
#[derive(Debug)]
pub struct WriteSink<W: Write>(pub W);

impl<W: Write> Sink for WriteSink<W> {
    #[inline]
    fn write(&mut self, data: &[u8], _channel: usize) {
        // A sink has no failure contract of its own (§6); callers that care
        // about write errors should check `self.0` directly after use.
        let _ = self.0.write_all(data);
    }
}

/// A [`Sink`] that dispatches `channel` to one of a small fixed set of
/// `Write` instances, clamping out-of-range channels to the last one.
#[derive(Debug)]
pub struct MultiWriteSink<W: Write> {
    outputs: Vec<W>,
}

impl<W: Write> MultiWriteSink<W> {
    /// Builds a sink over `outputs`; `outputs` must be non-empty.
    pub fn new(outputs: Vec<W>) -> Self {
        assert!(!outputs.is_empty(), "MultiWriteSink needs at least one output");
        MultiWriteSink { outputs }
    }

    /// Returns the underlying writers.
    pub fn into_inner(self) -> Vec<W> {
        self.outputs
    }
}

impl<W: Write> Sink for MultiWriteSink<W> {
    fn write(&mut self, data: &[u8], channel: usize) {
        let idx = channel.min(self.outputs.len() - 1);
        let _ = self.outputs[idx].write_all(data);
    }
}

/// A [`Sink`] that appends everything to an in-memory buffer, ignoring
/// `channel`. Mainly useful in tests.
#[derive(Debug, Default)]
pub struct VecSink(pub Vec<u8>);

impl Sink for VecSink {
    #[inline]
    fn write(&mut self, data: &[u8], _channel: usize) {
        self.0.extend_from_slice(data);
    }
}
