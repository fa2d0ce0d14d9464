//! The character-data decoder: folds `&name;` and `&#[x]N;` references in a
//! completed text fragment into their UTF-8 byte sequence.
//!
//! This never fails: an ill-formed reference (unknown name, non-hex/decimal
//! digits, a `&` with no following `;` before the end of the fragment) is
//! passed through verbatim, `&` and all. Decoding operates destructively on
//! an owned buffer via a scratch buffer and a swap — it never looks past
//! the fragment it's given, so it cannot observe bytes from a different
//! item (see `Driver` tie-breaks in the spec: entity decoding never spans
//! item boundaries).

/// Predefined and numeric character references recognized by [`decode`].
enum Entity {
    Named(&'static [u8]),
    Numeric(u32),
}

/// Replaces every recognized `&name;`/`&#N;`/`&#xN;` reference in `text`
/// with its decoded bytes, using `scratch` as working storage. `scratch` is
/// cleared on entry and left in an unspecified state on return (its
/// allocation is recycled into `text` via `swap`, so callers should not
/// rely on its contents).
pub fn decode(text: &mut Vec<u8>, scratch: &mut Vec<u8>) {
    if memchr::memchr(b'&', text).is_none() {
        return;
    }
    scratch.clear();
    scratch.reserve(text.len());

    let bytes = &text[..];
    let mut pos = 0;
    while let Some(amp_rel) = memchr::memchr(b'&', &bytes[pos..]) {
        let amp = pos + amp_rel;
        scratch.extend_from_slice(&bytes[pos..amp]);

        match memchr::memchr(b';', &bytes[amp + 1..]) {
            Some(semi_rel) => {
                let semi = amp + 1 + semi_rel;
                let body = &bytes[amp + 1..semi];
                match resolve(body) {
                    Some(Entity::Named(resolved)) => scratch.extend_from_slice(resolved),
                    Some(Entity::Numeric(codepoint)) => {
                        let mut buf = [0u8; 4];
                        let n = encode_utf8(codepoint, &mut buf);
                        scratch.extend_from_slice(&buf[..n]);
                    }
                    None => scratch.extend_from_slice(&bytes[amp..=semi]),
                }
                pos = semi + 1;
            }
            // No terminating ';' before the end of the fragment: the '&'
            // is passed through and the rest of the fragment is appended
            // unchanged below.
            None => {
                scratch.push(b'&');
                pos = amp + 1;
                break;
            }
        }
    }
    scratch.extend_from_slice(&bytes[pos..]);
    std::mem::swap(text, scratch);
}

fn resolve(body: &[u8]) -> Option<Entity> {
    match body {
        b"quot" => Some(Entity::Named(b"\"")),
        b"amp" => Some(Entity::Named(b"&")),
        b"apos" => Some(Entity::Named(b"'")),
        b"lt" => Some(Entity::Named(b"<")),
        b"gt" => Some(Entity::Named(b">")),
        _ => {
            if let Some(hex) = body.strip_prefix(b"#x").or_else(|| body.strip_prefix(b"#X")) {
                parse_hex(hex).map(Entity::Numeric)
            } else if let Some(dec) = body.strip_prefix(b"#") {
                parse_dec(dec).map(Entity::Numeric)
            } else {
                None
            }
        }
    }
}

fn parse_hex(digits: &[u8]) -> Option<u32> {
    // Max code point is 0x10FFFF, i.e. 6 hex digits.
    if digits.is_empty() || digits.len() > 6 {
        return None;
    }
    let mut code = 0u32;
    for &b in digits {
        let d = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return None,
        };
        code = (code << 4) | d as u32;
    }
    Some(code)
}

fn parse_dec(digits: &[u8]) -> Option<u32> {
    // Max code point 0x10FFFF = 1114111, i.e. 7 decimal digits.
    if digits.is_empty() || digits.len() > 7 {
        return None;
    }
    let mut code = 0u32;
    for &b in digits {
        match b {
            b'0'..=b'9' => code = code * 10 + (b - b'0') as u32,
            _ => return None,
        }
    }
    Some(code)
}

/// Encodes `cp` as UTF-8 into `buf`, returning the number of bytes written.
///
/// Follows the four code point ranges given by the spec literally rather
/// than going through `char`, so that out-of-range XML numeric references
/// (`cp >= 0x110000`) get a deterministic fallback instead of a panic or a
/// silently-dropped reference: they decode to U+FFFD REPLACEMENT CHARACTER
/// (an implementation choice the spec leaves open — see Q4 in DESIGN.md).
fn encode_utf8(cp: u32, buf: &mut [u8; 4]) -> usize {
    if cp < 0x80 {
        buf[0] = cp as u8;
        1
    } else if cp < 0x800 {
        buf[0] = 0xC0 | (cp >> 6) as u8;
        buf[1] = 0x80 | (cp & 0x3F) as u8;
        2
    } else if cp < 0x1_0000 {
        buf[0] = 0xE0 | (cp >> 12) as u8;
        buf[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        buf[2] = 0x80 | (cp & 0x3F) as u8;
        3
    } else if cp < 0x11_0000 {
        buf[0] = 0xF0 | (cp >> 18) as u8;
        buf[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
        buf[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        buf[3] = 0x80 | (cp & 0x3F) as u8;
        4
    } else {
        buf[0] = 0xEF;
        buf[1] = 0xBF;
        buf[2] = 0xBD;
        3
    }
}
