//! The lexical scanner: recognizes one item's worth of bytes starting at the
//! cursor's current position and classifies it.
//!
//! Every `scan_*` function assumes the cursor sits exactly where the item
//! begins and leaves it exactly where the next item begins (or at EOF). None
//! of them validate well-formedness beyond what's needed to find the item's
//! boundary — that's the reader's job, not this module's.

use crate::cursor::ByteCursor;
use crate::item::{ItemType, Options};
use crate::source::ByteSource;

/// Result of a single scan step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanOutcome {
    /// An item was recognized; `dst` holds its text.
    Item(ItemType),
    /// A `<`-initiated construct never found its closing delimiter before
    /// the source ran out.
    UnclosedTag,
}

/// Scans a text run: bytes up to (not including) the next `<`, or EOF.
pub fn scan_text<S: ByteSource>(cursor: &mut ByteCursor<S>, dst: &mut Vec<u8>) -> ScanOutcome {
    match cursor.append_seek_byte(b'<', false, dst, false) {
        Some(_) => ScanOutcome::Item(ItemType::EscapedText),
        None => ScanOutcome::Item(ItemType::End),
    }
}

/// Scans a tag-initiated item: cursor sits at the leading `<`.
pub fn scan_tag<S: ByteSource>(
    cursor: &mut ByteCursor<S>,
    dst: &mut Vec<u8>,
    depth: usize,
    options: &Options,
) -> ScanOutcome {
    dst.push(b'<');
    cursor.getc(); // consume the '<' we just peeked to get here

    match cursor.peek() {
        Some(b'/') => scan_end_tag(cursor, dst),
        Some(b'?') => scan_pi(cursor, dst),
        Some(b'!') => scan_bang(cursor, dst, depth, options),
        Some(_) => scan_start_tag(cursor, dst),
        None => ScanOutcome::UnclosedTag,
    }
}

fn scan_end_tag<S: ByteSource>(cursor: &mut ByteCursor<S>, dst: &mut Vec<u8>) -> ScanOutcome {
    dst.push(b'/');
    cursor.getc();
    match cursor.append_seek_byte(b'>', true, dst, true) {
        Some(_) => ScanOutcome::Item(ItemType::Suffix),
        None => ScanOutcome::UnclosedTag,
    }
}

fn scan_start_tag<S: ByteSource>(cursor: &mut ByteCursor<S>, dst: &mut Vec<u8>) -> ScanOutcome {
    // A bare "<>" has no name to scan; the original implementation special-
    // cases this (`c != '>' && append_seek_if(...)`) and stops rather than
    // treating it as an (empty-named) element.
    if cursor.peek() == Some(b'>') {
        cursor.getc();
        return ScanOutcome::Item(ItemType::End);
    }
    // Naive scan to the closing '>': a literal '>' inside a quoted attribute
    // value is not special-cased, matching the grammar this scanner
    // recognizes (and the original implementation this was ported from).
    match cursor.append_seek_byte(b'>', true, dst, true) {
        Some(_) => {
            let self_closing = dst.len() >= 2 && dst[dst.len() - 2] == b'/';
            ScanOutcome::Item(if self_closing {
                ItemType::SelfClosing
            } else {
                ItemType::Prefix
            })
        }
        None => ScanOutcome::UnclosedTag,
    }
}

fn scan_pi<S: ByteSource>(cursor: &mut ByteCursor<S>, dst: &mut Vec<u8>) -> ScanOutcome {
    dst.push(b'?');
    cursor.getc();
    if scan_until_terminator(cursor, dst, b"?>") {
        ScanOutcome::Item(ItemType::PI)
    } else {
        ScanOutcome::UnclosedTag
    }
}

fn scan_bang<S: ByteSource>(
    cursor: &mut ByteCursor<S>,
    dst: &mut Vec<u8>,
    depth: usize,
    options: &Options,
) -> ScanOutcome {
    dst.push(b'!');
    cursor.getc();

    if cursor.peek() == Some(b'-') {
        if cursor.append_match_literal(b"--", dst) == 2 {
            return scan_comment(cursor, dst);
        }
        return scan_dtd(cursor, dst);
    }

    if depth > 0 && cursor.peek() == Some(b'[') {
        if cursor.append_match_literal(b"[CDATA[", dst) == 7 {
            return scan_cdata(cursor, dst, options);
        }
        return scan_dtd(cursor, dst);
    }

    scan_dtd(cursor, dst)
}

fn scan_comment<S: ByteSource>(cursor: &mut ByteCursor<S>, dst: &mut Vec<u8>) -> ScanOutcome {
    if scan_until_terminator(cursor, dst, b"-->") {
        ScanOutcome::Item(ItemType::Comment)
    } else {
        ScanOutcome::UnclosedTag
    }
}

fn scan_cdata<S: ByteSource>(
    cursor: &mut ByteCursor<S>,
    dst: &mut Vec<u8>,
    options: &Options,
) -> ScanOutcome {
    if !options.keep_cdata_markers {
        dst.clear();
    }
    if !scan_until_terminator(cursor, dst, b"]]>") {
        return ScanOutcome::UnclosedTag;
    }
    if !options.keep_cdata_markers {
        dst.truncate(dst.len() - 3);
    }
    ScanOutcome::Item(ItemType::CData)
}

/// Scans a DTD body, counting nested `<...>` pairs (comments and PIs inside
/// the DTD are recognized so their own `<`/`>` don't throw off the count).
fn scan_dtd<S: ByteSource>(cursor: &mut ByteCursor<S>, dst: &mut Vec<u8>) -> ScanOutcome {
    let mut depth = 1usize;
    loop {
        match cursor.append_seek(|b| b == b'<' || b == b'>', true, dst, true) {
            Some(b'<') => match cursor.peek() {
                Some(b'!') => {
                    // A nested "<!--" re-enters comment recognition. A bare
                    // "<!" that isn't a comment (e.g. "<!ELEMENT") is
                    // consumed without affecting the nesting count, matching
                    // the lexical grammar this scanner recognizes: only
                    // plain "<...>" and "<?...?>" constructs count.
                    dst.push(b'!');
                    cursor.getc();
                    if cursor.append_match_literal(b"--", dst) == 2
                        && !scan_until_terminator(cursor, dst, b"-->")
                    {
                        return ScanOutcome::UnclosedTag;
                    }
                }
                Some(b'?') => {
                    dst.push(b'?');
                    cursor.getc();
                    if !scan_until_terminator(cursor, dst, b"?>") {
                        return ScanOutcome::UnclosedTag;
                    }
                }
                Some(_) => depth += 1,
                None => return ScanOutcome::UnclosedTag,
            },
            Some(_) => {
                depth -= 1;
                if depth == 0 {
                    return ScanOutcome::Item(ItemType::DTD);
                }
            }
            None => return ScanOutcome::UnclosedTag,
        }
    }
}

/// Scans forward appending bytes to `dst` until `terminator` is matched in
/// full, tolerating runs of the terminator's lead byte that don't pan out
/// (e.g. `----->`) by retrying from the next occurrence. Returns `false`
/// only when the source is genuinely exhausted before a match completes.
fn scan_until_terminator<S: ByteSource>(
    cursor: &mut ByteCursor<S>,
    dst: &mut Vec<u8>,
    terminator: &[u8],
) -> bool {
    let lead = terminator[0];
    loop {
        if cursor.append_seek_byte(lead, false, dst, false).is_none() {
            return false;
        }
        let matched = cursor.append_match_literal(terminator, dst);
        if matched == terminator.len() {
            return true;
        }
        if cursor.at_eof() {
            return false;
        }
        // Partial match due to a mismatch partway through the terminator,
        // with more data still available: the mismatching bytes are
        // already in `dst`; loop back and look for the next lead byte.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceSource;

    fn scan_tag_of(data: &'static [u8], depth: usize) -> (ScanOutcome, Vec<u8>) {
        let mut c = ByteCursor::new(4096);
        c.bind(SliceSource::new(data));
        let mut dst = Vec::new();
        let options = Options::default();
        c.peek();
        let outcome = scan_tag(&mut c, &mut dst, depth, &options);
        (outcome, dst)
    }

    #[test]
    fn start_tag_plain() {
        let (outcome, dst) = scan_tag_of(b"<a>rest", 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::Prefix));
        assert_eq!(dst, b"<a>");
    }

    #[test]
    fn start_tag_self_closing() {
        let (outcome, dst) = scan_tag_of(b"<a/>rest", 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::SelfClosing));
        assert_eq!(dst, b"<a/>");
    }

    #[test]
    fn bare_angle_brackets_is_end_not_empty_prefix() {
        let (outcome, dst) = scan_tag_of(b"<>rest", 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::End));
        assert_eq!(dst, b"<");
    }

    #[test]
    fn start_tag_with_literal_gt_in_attribute_is_naive() {
        // Documents the naive-scan behavior: a '>' inside a quoted value
        // ends the tag early, same as the original implementation.
        let (outcome, dst) = scan_tag_of(b"<a x=\"a>b\">rest", 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::Prefix));
        assert_eq!(dst, b"<a x=\"a>");
    }

    #[test]
    fn end_tag() {
        let (outcome, dst) = scan_tag_of(b"</a>rest", 1);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::Suffix));
        assert_eq!(dst, b"</a>");
    }

    #[test]
    fn unclosed_start_tag() {
        let (outcome, _) = scan_tag_of(b"<a x=\"1\"", 0);
        assert_eq!(outcome, ScanOutcome::UnclosedTag);
    }

    #[test]
    fn processing_instruction() {
        let (outcome, dst) = scan_tag_of(b"<?xml version=\"1.0\"?>rest", 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::PI));
        assert_eq!(dst, b"<?xml version=\"1.0\"?>");
    }

    #[test]
    fn comment_with_dash_run() {
        // B2: a run of extra dashes before the real terminator.
        let (outcome, dst) = scan_tag_of(b"<!--abc------>rest", 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::Comment));
        assert_eq!(dst, b"<!--abc------>");
    }

    #[test]
    fn unclosed_comment() {
        let (outcome, _) = scan_tag_of(b"<!--abc--", 0);
        assert_eq!(outcome, ScanOutcome::UnclosedTag);
    }

    #[test]
    fn cdata_at_depth_strips_markers_by_default() {
        let (outcome, dst) = scan_tag_of(b"<![CDATA[a]]b]]>rest", 1);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::CData));
        assert_eq!(dst, b"a]]b");
    }

    #[test]
    fn cdata_keeps_markers_when_requested() {
        let mut c = ByteCursor::new(4096);
        c.bind(SliceSource::new(b"<![CDATA[a]]>rest"));
        let mut dst = Vec::new();
        c.peek();
        let options = Options { keep_entities: false, keep_cdata_markers: true };
        let outcome = scan_tag(&mut c, &mut dst, 1, &options);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::CData));
        assert_eq!(dst, b"<![CDATA[a]]>");
    }

    #[test]
    fn cdata_marker_at_depth_zero_is_dtd() {
        // Q3: "<![CDATA[" is only recognized as CDATA inside an element.
        let (outcome, dst) = scan_tag_of(b"<![CDATA[x]>rest", 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::DTD));
        assert_eq!(dst, b"<![CDATA[x]>");
    }

    #[test]
    fn dtd_simple() {
        let (outcome, dst) = scan_tag_of(b"<!DOCTYPE root>rest", 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::DTD));
        assert_eq!(dst, b"<!DOCTYPE root>");
    }

    #[test]
    fn dtd_with_nested_brackets() {
        // A bare nested "<...>" (not introduced by '!' or '?') does bump the
        // nesting counter, so its own '>' doesn't close the outer DTD early.
        let (outcome, dst) = scan_tag_of(b"<!DOCTYPE root [ <x> ]>rest", 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::DTD));
        assert_eq!(dst, b"<!DOCTYPE root [ <x> ]>");
    }

    #[test]
    fn dtd_element_declaration_closes_nesting_early() {
        // A nested "<!ELEMENT ...>" doesn't bump the counter (only a
        // genuine comment does), so its own '>' closes the *outer* DTD
        // immediately rather than nesting — this mirrors the scanner this
        // was ported from rather than a validating parser's expectations.
        let (outcome, dst) = scan_tag_of(b"<!DOCTYPE root [ <!ELEMENT a (b)> ]>rest", 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::DTD));
        assert_eq!(dst, b"<!DOCTYPE root [ <!ELEMENT a (b)>");
    }

    #[test]
    fn dtd_with_nested_comment_and_pi() {
        let input: &[u8] = b"<!DOCTYPE root [ <!-- a > b --> <?pi a > b?> ]>rest";
        let (outcome, dst) = scan_tag_of(input, 0);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::DTD));
        assert_eq!(dst, &input[..input.len() - 4]);
    }

    #[test]
    fn unclosed_dtd() {
        let (outcome, _) = scan_tag_of(b"<!DOCTYPE root", 0);
        assert_eq!(outcome, ScanOutcome::UnclosedTag);
    }

    #[test]
    fn text_run_then_tag() {
        let mut c = ByteCursor::new(4096);
        c.bind(SliceSource::new(b"hello<a>"));
        let mut dst = Vec::new();
        let outcome = scan_text(&mut c, &mut dst);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::EscapedText));
        assert_eq!(dst, b"hello");
        assert_eq!(c.peek(), Some(b'<'));
    }

    #[test]
    fn text_run_at_eof_is_end() {
        let mut c = ByteCursor::new(4096);
        c.bind(SliceSource::new(b""));
        let mut dst = Vec::new();
        let outcome = scan_text(&mut c, &mut dst);
        assert_eq!(outcome, ScanOutcome::Item(ItemType::End));
        assert!(dst.is_empty());
    }

    #[test]
    fn tag_scan_at_eof_after_lt_is_unclosed() {
        let mut c = ByteCursor::new(4096);
        c.bind(SliceSource::new(b"<"));
        let mut dst = Vec::new();
        c.peek();
        let outcome = scan_tag(&mut c, &mut dst, 0, &Options::default());
        assert_eq!(outcome, ScanOutcome::UnclosedTag);
    }
}
