//! The byte cursor: a sliding window over a [`ByteSource`], exposing
//! character-level primitives that transparently cross buffer boundaries.
//!
//! Cursor operations never fail outright (see the module-level note in
//! `reader.rs`): a read failure on the underlying source is recorded
//! internally and surfaces as EOF to every primitive here. The driver picks
//! the failure back up with [`ByteCursor::take_io_error`] once it sees EOF.

use std::io;

use crate::source::ByteSource;

/// Read-buffer alignment granularity; capacities are rounded up to a
/// multiple of this.
const GRANULARITY: usize = 0x10000;

/// Default buffer capacity used by [`crate::Reader::new`].
pub const DEFAULT_CAPACITY: usize = GRANULARITY * 4;

pub(crate) fn round_up_to_granularity(n: usize) -> usize {
    let n = n.max(1);
    ((n + GRANULARITY - 1) / GRANULARITY) * GRANULARITY
}

/// A fixed-capacity sliding window over a [`ByteSource`].
///
/// Invariant: `0 <= head <= limit <= buf.len()`. Bytes before `head` are
/// consumed; bytes in `[head, limit)` are pending and not yet handed to a
/// caller.
pub struct ByteCursor<S> {
    buf: Vec<u8>,
    head: usize,
    limit: usize,
    source: Option<S>,
    consumed: u64,
    /// Set once the source has reported clean EOF or a read failure; no
    /// further refill attempts are made until a new source is bound.
    exhausted: bool,
    io_error: Option<io::Error>,
}

impl<S: ByteSource> ByteCursor<S> {
    /// Creates a cursor with the given buffer capacity, rounded up to the
    /// read-buffer granularity.
    pub fn new(capacity: usize) -> Self {
        ByteCursor {
            buf: vec![0u8; round_up_to_granularity(capacity)],
            head: 0,
            limit: 0,
            source: None,
            consumed: 0,
            exhausted: false,
            io_error: None,
        }
    }

    /// Attaches `source`, discarding any pending bytes and resetting
    /// consumed-byte accounting.
    pub fn bind(&mut self, source: S) {
        self.source = Some(source);
        self.head = 0;
        self.limit = 0;
        self.consumed = 0;
        self.exhausted = false;
        self.io_error = None;
    }

    /// Detaches the current source, if any, returning it.
    pub fn release(&mut self) -> Option<S> {
        self.source.take()
    }

    /// Total bytes consumed (advanced past) since the last `bind`.
    #[inline]
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    /// `true` once the source is exhausted (clean EOF or failure) and no
    /// pending bytes remain.
    #[inline]
    pub fn at_eof(&self) -> bool {
        self.exhausted && self.head == self.limit
    }

    /// Takes the I/O error recorded by the most recent failed `refill`, if
    /// any. Cleared once taken.
    pub fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    /// Brings more bytes into `[head, limit)`, compacting the pending
    /// region to the front of the buffer first. Returns `false` if no more
    /// bytes are available (clean EOF or a now-recorded read failure).
    fn refill_buffer(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if self.head == self.limit {
            self.head = 0;
            self.limit = 0;
        } else if self.head > 0 {
            self.buf.copy_within(self.head..self.limit, 0);
            self.limit -= self.head;
            self.head = 0;
        }
        if self.limit == self.buf.len() {
            // The whole buffer is pending and still not enough: grow rather
            // than stall. Only pathological inputs (a single item longer
            // than the configured capacity) hit this.
            let grow_by = self.buf.len();
            self.buf.resize(self.buf.len() + grow_by, 0);
        }
        let source = match self.source.as_mut() {
            Some(s) => s,
            None => {
                self.exhausted = true;
                return false;
            }
        };
        match source.refill(&mut self.buf[self.limit..]) {
            Ok(0) => {
                self.exhausted = true;
                false
            }
            Ok(n) => {
                self.limit += n;
                true
            }
            Err(e) => {
                self.exhausted = true;
                self.io_error = Some(e);
                false
            }
        }
    }

    #[inline]
    fn ensure_data(&mut self) -> bool {
        self.head < self.limit || self.refill_buffer()
    }

    /// Returns the byte at `head` without advancing, refilling on demand.
    pub fn peek(&mut self) -> Option<u8> {
        if self.ensure_data() {
            Some(self.buf[self.head])
        } else {
            None
        }
    }

    /// Returns `peek()` and, if not EOF, advances past it.
    pub fn getc(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.head += 1;
        self.consumed += 1;
        Some(b)
    }

    /// If the current byte satisfies `pred`, advances past it and returns
    /// `true`; otherwise leaves `head` untouched and returns `false`.
    pub fn skip_if<F: FnOnce(u8) -> bool>(&mut self, pred: F) -> bool {
        match self.peek() {
            Some(b) if pred(b) => {
                self.head += 1;
                self.consumed += 1;
                true
            }
            _ => false,
        }
    }

    /// Advances until the first byte matching `pred`, or EOF. If found and
    /// `also_skip`, advances one past it.
    pub fn seek<F: FnMut(u8) -> bool>(&mut self, mut pred: F, also_skip: bool) -> Option<u8> {
        loop {
            let b = self.peek()?;
            if pred(b) {
                if also_skip {
                    self.head += 1;
                    self.consumed += 1;
                }
                return Some(b);
            }
            self.head += 1;
            self.consumed += 1;
        }
    }

    /// Like [`ByteCursor::seek`] specialized for a single target byte,
    /// taking the `memchr` fast path over each pending chunk.
    pub fn seek_byte(&mut self, target: u8, also_skip: bool) -> Option<u8> {
        loop {
            if self.head >= self.limit && !self.refill_buffer() {
                return None;
            }
            let avail = &self.buf[self.head..self.limit];
            match memchr::memchr(target, avail) {
                Some(off) => {
                    self.head += off;
                    self.consumed += off as u64;
                    if also_skip {
                        self.head += 1;
                        self.consumed += 1;
                    }
                    return Some(target);
                }
                None => {
                    let skipped = avail.len();
                    self.head = self.limit;
                    self.consumed += skipped as u64;
                }
            }
        }
    }

    /// Like [`ByteCursor::seek`], appending every byte passed over to
    /// `dst`. If `also_append` and a match is found, the matched byte is
    /// appended too.
    pub fn append_seek<F: FnMut(u8) -> bool>(
        &mut self,
        mut pred: F,
        also_skip: bool,
        dst: &mut Vec<u8>,
        also_append: bool,
    ) -> Option<u8> {
        loop {
            let b = self.peek()?;
            if pred(b) {
                if also_append {
                    dst.push(b);
                }
                if also_skip {
                    self.head += 1;
                    self.consumed += 1;
                }
                return Some(b);
            }
            dst.push(b);
            self.head += 1;
            self.consumed += 1;
        }
    }

    /// [`ByteCursor::append_seek`] specialized for a single target byte,
    /// taking the `memchr` fast path.
    pub fn append_seek_byte(
        &mut self,
        target: u8,
        also_skip: bool,
        dst: &mut Vec<u8>,
        also_append: bool,
    ) -> Option<u8> {
        loop {
            if self.head >= self.limit && !self.refill_buffer() {
                return None;
            }
            let avail = &self.buf[self.head..self.limit];
            match memchr::memchr(target, avail) {
                Some(off) => {
                    dst.extend_from_slice(&avail[..off]);
                    self.head += off;
                    self.consumed += off as u64;
                    if also_append {
                        dst.push(target);
                    }
                    if also_skip {
                        self.head += 1;
                        self.consumed += 1;
                    }
                    return Some(target);
                }
                None => {
                    dst.extend_from_slice(avail);
                    let n = avail.len();
                    self.head = self.limit;
                    self.consumed += n as u64;
                }
            }
        }
    }

    /// Advances `head` while the next bytes match `literal`, stopping at
    /// the first mismatch, stream exhaustion, or end of `literal`. Returns
    /// the number of matched bytes.
    ///
    /// If fewer than `literal.len()` bytes matched because the stream ran
    /// dry mid-match (not because of a mismatch), a refill is performed and
    /// matching resumes from the partial position — this is the
    /// partial-match-across-refill contract callers rely on to recognize
    /// multi-byte terminators (`-->`, `]]>`, `?>`, ...) that straddle a
    /// buffer boundary.
    pub fn match_literal(&mut self, literal: &[u8]) -> usize {
        self.match_literal_impl(literal, None)
    }

    /// Like [`ByteCursor::match_literal`], appending matched bytes to `dst`.
    pub fn append_match_literal(&mut self, literal: &[u8], dst: &mut Vec<u8>) -> usize {
        self.match_literal_impl(literal, Some(dst))
    }

    fn match_literal_impl(&mut self, literal: &[u8], mut dst: Option<&mut Vec<u8>>) -> usize {
        let mut matched = 0;
        while matched < literal.len() {
            if self.head >= self.limit && !self.refill_buffer() {
                break;
            }
            let avail = &self.buf[self.head..self.limit];
            let want = literal.len() - matched;
            let take = avail.len().min(want);

            let mut i = 0;
            while i < take && avail[i] == literal[matched + i] {
                i += 1;
            }
            if let Some(dst) = dst.as_deref_mut() {
                dst.extend_from_slice(&avail[..i]);
            }
            self.head += i;
            self.consumed += i as u64;
            matched += i;

            if i < take {
                // Mismatch: `avail[i]` differs from `literal[matched - i + i]`.
                break;
            }
            // i == take: every available byte matched. If `take < want` we
            // simply ran out of pending bytes, not out of literal — loop
            // back around to refill and keep matching.
        }
        matched
    }
}
