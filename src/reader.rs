//! The driver: sequences cursor and scanner calls into the public `next()`
//! iteration, enforces document-vs-element-level policy, maintains the path
//! stack, and owns the sticky error/end state.

use std::fs::File;
use std::path::Path;

use crate::cursor::{self, ByteCursor};
use crate::decode;
use crate::error::{Error, ErrorCode};
use crate::item::{ItemType, Options};
use crate::path::{self, Attributes, PathStack};
use crate::scanner::{self, ScanOutcome};
use crate::sink::Sink;
use crate::source::{ByteSource, ReaderSource};

/// A pull parser over a [`ByteSource`] of type `S`.
///
/// One call to [`Reader::next`] produces one item: a tag, a text run, a
/// CDATA section, a PI, a comment, or a DTD. The text of the current item
/// and the stack of currently open elements remain valid until the next
/// call to `next()`.
pub struct Reader<S> {
    cursor: ByteCursor<S>,
    text: Vec<u8>,
    scratch: Vec<u8>,
    path: PathStack,
    item_type: ItemType,
    options: Options,
    error_code: ErrorCode,
    last_error: Option<Error>,
}

impl<S: ByteSource> Reader<S> {
    /// Creates an unbound reader with the given buffer capacity, rounded up
    /// to the cursor's granularity.
    pub fn new(capacity: usize) -> Self {
        Reader {
            cursor: ByteCursor::new(capacity),
            text: Vec::new(),
            scratch: Vec::new(),
            path: PathStack::new(),
            item_type: ItemType::Begin,
            options: Options::default(),
            error_code: ErrorCode::Ok,
            last_error: None,
        }
    }

    /// Attaches `source`, discarding any in-progress item, path, and error
    /// state from a previous binding.
    pub fn bind(&mut self, source: S) {
        self.cursor.bind(source);
        self.text.clear();
        self.path.clear();
        self.item_type = ItemType::Begin;
        self.error_code = ErrorCode::Ok;
        self.last_error = None;
    }

    /// Detaches the current source, if any, returning it. The reader keeps
    /// its last item and path state until the next `bind`.
    pub fn release(&mut self) -> Option<S> {
        self.cursor.release()
    }

    fn set_error(&mut self, err: Error) {
        self.error_code = ErrorCode::from(&err);
        self.last_error = Some(err);
        self.item_type = ItemType::End;
    }

    /// Settles the sticky end state once the cursor has run dry: a prior
    /// read failure wins over everything else, then unmatched open
    /// elements, then a clean `Ok` end.
    fn finish_eof(&mut self) -> bool {
        if let Some(e) = self.cursor.take_io_error() {
            self.set_error(Error::ReadFailed(e));
        } else if self.path.depth() > 0 {
            self.set_error(Error::UnmatchedEndTag);
        } else {
            self.item_type = ItemType::End;
        }
        false
    }

    fn finish_unclosed(&mut self) -> bool {
        if let Some(e) = self.cursor.take_io_error() {
            self.set_error(Error::ReadFailed(e));
        } else {
            self.set_error(Error::UnclosedTag);
        }
        false
    }

    /// Advances to the next item. Returns `false` when no further items can
    /// be produced, whether cleanly (`error_code() == ErrorCode::Ok`) or
    /// because of a sticky error.
    pub fn next(&mut self) -> bool {
        if self.item_type == ItemType::End {
            return false;
        }
        if self.item_type.is_element_end() {
            self.path.pop();
        }

        loop {
            self.text.clear();

            let first = match self.cursor.seek(|b| b > b' ', false) {
                Some(b) => b,
                None => return self.finish_eof(),
            };

            if first == b'<' {
                let depth = self.path.depth();
                return match scanner::scan_tag(&mut self.cursor, &mut self.text, depth, &self.options) {
                    ScanOutcome::Item(ItemType::Prefix) => {
                        self.path.push(&self.text);
                        self.item_type = ItemType::Prefix;
                        true
                    }
                    ScanOutcome::Item(ItemType::SelfClosing) => {
                        self.path.push(&self.text);
                        self.item_type = ItemType::SelfClosing;
                        true
                    }
                    ScanOutcome::Item(ItemType::Suffix) => {
                        if depth > 0 {
                            self.item_type = ItemType::Suffix;
                            true
                        } else {
                            self.set_error(Error::UnmatchedEndTag);
                            false
                        }
                    }
                    ScanOutcome::Item(it @ (ItemType::PI | ItemType::Comment | ItemType::DTD)) => {
                        self.item_type = it;
                        true
                    }
                    ScanOutcome::Item(ItemType::CData) => {
                        // Only ever constructed at depth > 0 (Q3): the
                        // scanner reads a bare "<![CDATA[" at depth 0 as a
                        // DTD instead.
                        self.item_type = ItemType::CData;
                        true
                    }
                    ScanOutcome::Item(ItemType::End) => {
                        // A bare "<>" has no name to scan as a tag; the
                        // scanner stops rather than treating it as an
                        // (empty-named) element. Settle the same way
                        // reaching real EOF would: Ok if nothing is left
                        // open, UnmatchedEndTag otherwise (I4).
                        self.finish_eof()
                    }
                    ScanOutcome::Item(ItemType::Begin)
                    | ScanOutcome::Item(ItemType::EscapedText) => {
                        unreachable!("tag scan cannot yield this")
                    }
                    ScanOutcome::UnclosedTag => self.finish_unclosed(),
                };
            }

            match scanner::scan_text(&mut self.cursor, &mut self.text) {
                ScanOutcome::Item(ItemType::EscapedText) => {
                    if self.path.depth() > 0 {
                        if !self.options.keep_entities {
                            decode::decode(&mut self.text, &mut self.scratch);
                        }
                        self.item_type = ItemType::EscapedText;
                        return true;
                    }
                    // Character data at document level (whitespace, BOM
                    // remnants, ...) is not an item; discard and keep going.
                    continue;
                }
                _ => return self.finish_eof(),
            }
        }
    }

    /// Like [`Reader::next`], additionally returning `false` once the
    /// current item is the element-end (`Suffix` or `SelfClosing`) that
    /// closes the element whose own depth (as reported by [`Reader::depth`]
    /// right after it was pushed) equals `level`. Used to bound iteration
    /// to one subtree.
    pub fn next_within(&mut self, level: usize) -> bool {
        if !self.next() {
            return false;
        }
        !(self.item_type.is_element_end() && self.path.depth() == level)
    }

    /// If positioned on a `Prefix`, advances past its matching end-tag. A
    /// no-op on any other current item.
    pub fn skip_element(&mut self) {
        if self.item_type == ItemType::Prefix {
            let level = self.path.depth();
            while self.next_within(level) {}
            self.next();
        }
    }

    /// `true` for `Prefix`, `Suffix`, or `SelfClosing`.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(
            self.item_type,
            ItemType::Prefix | ItemType::Suffix | ItemType::SelfClosing
        )
    }

    /// `true` for `Prefix` or `SelfClosing`.
    #[inline]
    pub fn is_prefix(&self) -> bool {
        self.item_type.is_prefix()
    }

    #[inline]
    pub fn is_suffix(&self) -> bool {
        matches!(self.item_type, ItemType::Suffix)
    }

    #[inline]
    pub fn is_self_closing(&self) -> bool {
        matches!(self.item_type, ItemType::SelfClosing)
    }

    /// `true` for `Suffix` or `SelfClosing`.
    #[inline]
    pub fn is_element_end(&self) -> bool {
        self.item_type.is_element_end()
    }

    /// `true` for character data of any kind: `EscapedText` or `CData`.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.item_type, ItemType::EscapedText | ItemType::CData)
    }

    #[inline]
    pub fn is_cdata(&self) -> bool {
        matches!(self.item_type, ItemType::CData)
    }

    #[inline]
    pub fn is_escaped_text(&self) -> bool {
        matches!(self.item_type, ItemType::EscapedText)
    }

    #[inline]
    pub fn is_pi(&self) -> bool {
        matches!(self.item_type, ItemType::PI)
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self.item_type, ItemType::Comment)
    }

    #[inline]
    pub fn is_dtd(&self) -> bool {
        matches!(self.item_type, ItemType::DTD)
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        matches!(self.item_type, ItemType::End)
    }

    /// The current item's classification.
    #[inline]
    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    /// The current item's bytes: for tags, the full literal form including
    /// angle brackets; for text, raw or decoded per [`Options`]; for CDATA,
    /// the payload or the full `<![CDATA[...]]>` wrapper per [`Options`].
    #[inline]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Number of currently open elements; `0` at document level.
    #[inline]
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// The ancestor chain of currently open elements.
    #[inline]
    pub fn path(&self) -> &PathStack {
        &self.path
    }

    /// The element name of the innermost open element.
    pub fn name(&self) -> &[u8] {
        path::name(self.path.top())
    }

    /// The element name of the open element at depth `i + 1` (0-based,
    /// outermost first).
    pub fn name_at(&self, i: usize) -> &[u8] {
        path::name(self.path.get(i))
    }

    /// `true` if the innermost open element's start-tag carries attributes.
    pub fn has_attributes(&self) -> bool {
        path::has_attributes(self.path.top())
    }

    /// Iterates the innermost open element's attributes.
    pub fn attributes(&self) -> Attributes<'_> {
        path::attributes(self.path.top())
    }

    /// Iterates the attributes of the open element at depth `i + 1`.
    pub fn attributes_at(&self, i: usize) -> Attributes<'_> {
        path::attributes(self.path.get(i))
    }

    /// Current behavior flags.
    #[inline]
    pub fn get_options(&self) -> Options {
        self.options
    }

    /// Replaces the behavior flags, effective starting with the next item.
    #[inline]
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    /// `true` once iteration has ended without error.
    #[inline]
    pub fn eof(&self) -> bool {
        self.item_type == ItemType::End && self.error_code == ErrorCode::Ok
    }

    /// The error that ended iteration, if any.
    #[inline]
    pub fn error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// The sticky error code.
    #[inline]
    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    /// Total bytes consumed from the current source since the last `bind`.
    #[inline]
    pub fn bytes_consumed(&self) -> u64 {
        self.cursor.bytes_consumed()
    }

    /// Writes the current item's bytes to `sink` on `channel`, then
    /// advances with [`Reader::next`].
    pub fn write_item<K: Sink>(&mut self, sink: &mut K, channel: usize) -> bool {
        sink.write(&self.text, channel);
        self.next()
    }

    /// Writes the current item and, if it is a `Prefix`, every descendant
    /// item through its matching end-tag, then advances past it. A no-op
    /// beyond writing the current item if it is not an open element.
    pub fn write_element<K: Sink>(&mut self, sink: &mut K, channel: usize) {
        match self.item_type {
            ItemType::SelfClosing => {
                sink.write(&self.text, channel);
                self.next();
            }
            ItemType::Prefix => {
                sink.write(&self.text, channel);
                let level = self.path.depth();
                while self.next_within(level) {
                    sink.write(&self.text, channel);
                }
                if self.item_type.is_element_end() && self.path.depth() == level {
                    sink.write(&self.text, channel);
                    self.next();
                }
            }
            _ => {
                sink.write(&self.text, channel);
                self.next();
            }
        }
    }
}

impl Reader<ReaderSource<File>> {
    /// Opens `path` and binds it, using the default buffer capacity. On
    /// failure to open the file, the reader is left in the sticky
    /// `OpenFailed` state rather than returning a `Result` — consistent
    /// with every other failure mode being surfaced through
    /// [`Reader::error_code`].
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Reader::open_with_capacity(path, cursor::DEFAULT_CAPACITY)
    }

    /// Like [`Reader::open`], with an explicit buffer capacity.
    pub fn open_with_capacity<P: AsRef<Path>>(path: P, capacity: usize) -> Self {
        let mut reader = Reader::new(capacity);
        match ReaderSource::open(path) {
            Ok(source) => reader.bind(source),
            Err(e) => reader.set_error(Error::OpenFailed(e)),
        }
        reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::VecSink;
    use crate::source::SliceSource;

    fn reader_of(data: &'static [u8]) -> Reader<SliceSource<'static>> {
        let mut r = Reader::new(4096);
        r.bind(SliceSource::new(data));
        r
    }

    #[test]
    fn scenario_simple_element() {
        let mut r = reader_of(b"<a>hi</a>");

        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::Prefix);
        assert_eq!(r.text(), b"<a>");
        assert_eq!(r.depth(), 1);

        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::EscapedText);
        assert_eq!(r.text(), b"hi");
        assert_eq!(r.depth(), 1);

        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::Suffix);
        assert_eq!(r.text(), b"</a>");
        // The pop for this Suffix is deferred to the *next* next() call, so
        // the element it closes is still nominally on the stack here.
        assert_eq!(r.depth(), 1);

        assert!(!r.next());
        assert!(r.eof());
        assert_eq!(r.depth(), 0);
        assert_eq!(r.error_code(), ErrorCode::Ok);
    }

    #[test]
    fn scenario_self_closing_with_attribute() {
        let mut r = reader_of(b"<a x=\"1\"/>");
        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::SelfClosing);
        assert_eq!(r.text(), b"<a x=\"1\"/>");
        let attrs: Vec<_> = r.attributes().collect();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, b"x");
        assert_eq!(attrs[0].value, b"1");

        assert!(!r.next());
        assert!(r.eof());
    }

    #[test]
    fn scenario_nested_elements_track_max_depth() {
        let mut r = reader_of(b"<a><b/></a>");
        let mut max_depth = 0;
        assert!(r.next());
        max_depth = max_depth.max(r.depth());
        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::SelfClosing);
        max_depth = max_depth.max(r.depth());
        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::Suffix);
        assert_eq!(r.depth(), 1); // pop for this Suffix hasn't happened yet
        assert!(!r.next());
        assert_eq!(r.depth(), 0);
        assert_eq!(max_depth, 2);
    }

    #[test]
    fn scenario_prolog_and_epilog_items() {
        let mut r = reader_of(b"<?xml v=\"1\"?><!--c--><r/>");
        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::PI);
        assert_eq!(r.text(), b"<?xml v=\"1\"?>");

        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::Comment);
        assert_eq!(r.text(), b"<!--c-->");

        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::SelfClosing);

        assert!(!r.next());
        assert!(r.eof());
    }

    #[test]
    fn scenario_entity_decoding_in_text() {
        let mut r = reader_of(b"<a>&lt;x&gt;&#65;</a>");
        assert!(r.next());
        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::EscapedText);
        assert_eq!(r.text(), b"<xA");
    }

    #[test]
    fn scenario_unclosed_element_is_unmatched_end_tag() {
        let mut r = reader_of(b"<a>");
        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::Prefix);

        assert!(!r.next());
        assert_eq!(r.item_type(), ItemType::End);
        assert_eq!(r.error_code(), ErrorCode::UnmatchedEndTag);
        assert!(r.error().is_some());
    }

    #[test]
    fn end_tag_at_document_level_is_an_error() {
        let mut r = reader_of(b"</a>");
        assert!(!r.next());
        assert_eq!(r.error_code(), ErrorCode::UnmatchedEndTag);
    }

    #[test]
    fn unclosed_tag_sets_unclosed_tag_error() {
        let mut r = reader_of(b"<a x=\"1\"");
        assert!(!r.next());
        assert_eq!(r.error_code(), ErrorCode::UnclosedTag);
    }

    #[test]
    fn bare_angle_brackets_stops_at_document_level_without_error() {
        let mut r = reader_of(b"<>");
        assert!(!r.next());
        assert_eq!(r.item_type(), ItemType::End);
        assert_eq!(r.error_code(), ErrorCode::Ok);
    }

    #[test]
    fn bare_angle_brackets_with_open_elements_is_unmatched_end_tag() {
        let mut r = reader_of(b"<a><></a>");
        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::Prefix);

        assert!(!r.next());
        assert_eq!(r.item_type(), ItemType::End);
        assert_eq!(r.error_code(), ErrorCode::UnmatchedEndTag);
    }

    #[test]
    fn keep_entities_preserves_raw_text() {
        let mut r = reader_of(b"<a>&lt;</a>");
        r.set_options(Options { keep_entities: true, keep_cdata_markers: false });
        assert!(r.next());
        assert!(r.next());
        assert_eq!(r.text(), b"&lt;");
    }

    #[test]
    fn end_is_sticky() {
        let mut r = reader_of(b"<a/>");
        assert!(r.next());
        assert!(!r.next());
        assert!(r.eof());
        assert!(!r.next());
        assert!(r.eof());
    }

    #[test]
    fn skip_element_bounds_to_matching_end_tag() {
        let mut r = reader_of(b"<a><b><c/></b>text</a>after");
        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::Prefix);
        assert_eq!(r.name(), b"a");

        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::Prefix);
        assert_eq!(r.name(), b"b");
        r.skip_element();
        // skip_element advances past "b"'s matching end-tag, landing on the
        // next item with only "a" left open.
        assert_eq!(r.item_type(), ItemType::EscapedText);
        assert_eq!(r.text(), b"text");
        assert_eq!(r.depth(), 1);

        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::Suffix);
        assert_eq!(r.text(), b"</a>");
    }

    #[test]
    fn next_within_stops_at_subtree_boundary() {
        let mut r = reader_of(b"<a><b/><c/></a>tail");
        assert!(r.next());
        assert_eq!(r.item_type(), ItemType::Prefix);
        let level = r.depth();

        let mut seen = Vec::new();
        while r.next_within(level) {
            seen.push(r.item_type());
        }
        // The final Suffix is still delivered; next_within just reports it
        // as the last one.
        assert_eq!(r.item_type(), ItemType::Suffix);
        assert_eq!(seen, vec![ItemType::SelfClosing, ItemType::SelfClosing]);
    }

    #[test]
    fn write_item_copies_bytes_and_advances() {
        let mut r = reader_of(b"<a>hi</a>");
        let mut sink = VecSink::default();
        assert!(r.next());
        assert!(r.write_item(&mut sink, 0));
        assert_eq!(sink.0, b"<a>");
        assert_eq!(r.item_type(), ItemType::EscapedText);
    }

    #[test]
    fn write_element_copies_whole_subtree() {
        let mut r = reader_of(b"<a><b/>x</a>tail");
        let mut sink = VecSink::default();
        assert!(r.next());
        r.write_element(&mut sink, 0);
        assert_eq!(sink.0, b"<a><b/>x</a>");
    }

    #[test]
    fn bytes_consumed_reaches_input_length_at_clean_eof() {
        let data: &[u8] = b"<a>hi</a>";
        let mut r = reader_of(data);
        while r.next() {}
        assert_eq!(r.bytes_consumed(), data.len() as u64);
    }
}
