//! The byte source trait consumed by [`crate::cursor::ByteCursor`], and a
//! couple of concrete realizations of it.
//!
//! A source is a forward-only producer of bytes. It is not required to be
//! seekable. `refill` may be called any number of times during a single
//! `Reader::next()` call.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// External collaborator the cursor pulls bytes from.
///
/// Implementations need not buffer internally; the cursor already owns a
/// buffer and only calls `refill` when it runs out of pending bytes.
pub trait ByteSource {
    /// Fill `dst` with up to `dst.len()` bytes, returning the number
    /// written. `Ok(0)` means clean end-of-input.
    fn refill(&mut self, dst: &mut [u8]) -> io::Result<usize>;
}

/// Wraps any [`Read`] implementor (including [`File`]) as a [`ByteSource`].
#[derive(Debug)]
pub struct ReaderSource<R: Read>(R);

impl<R: Read> ReaderSource<R> {
    /// Wraps an existing reader.
    pub fn new(reader: R) -> Self {
        ReaderSource(reader)
    }

    /// Unwraps this source, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl ReaderSource<File> {
    /// Opens `path` for reading. The `OpenFailed` mapping happens at the
    /// [`crate::Reader::bind`] call site, not here.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(ReaderSource(File::open(path)?))
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    #[inline]
    fn refill(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.0.read(dst) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Wraps an in-memory byte slice as a [`ByteSource`], for small inputs and
/// tests. Each `refill` hands out the next chunk of the remaining slice
/// without an intermediate copy beyond the final `copy_from_slice` into the
/// cursor's buffer.
#[derive(Debug)]
pub struct SliceSource<'a> {
    remaining: &'a [u8],
}

impl<'a> SliceSource<'a> {
    /// Wraps `data`; subsequent `refill` calls consume it front-to-back.
    pub fn new(data: &'a [u8]) -> Self {
        SliceSource { remaining: data }
    }
}

impl<'a> ByteSource for SliceSource<'a> {
    #[inline]
    fn refill(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let n = dst.len().min(self.remaining.len());
        dst[..n].copy_from_slice(&self.remaining[..n]);
        self.remaining = &self.remaining[n..];
        Ok(n)
    }
}
