//! Markup sniffing and the plain text heuristic.

use crate::media::MediaType;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const HTML_MARKERS: &[&[u8]] = &[b"<!doctype html", b"<html", b"<head", b"<body", b"<title"];

/// Share of printable bytes a non UTF-8 head needs to count as text.
const PRINTABLE_RATIO: f64 = 0.9;

fn trim_prolog(head: &[u8]) -> &[u8] {
    let head = head.strip_prefix(UTF8_BOM).unwrap_or(head);
    let start = head.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(head.len());
    &head[start..]
}

fn starts_with_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

/// Recognises XML and HTML documents by their first tag.
pub(super) fn match_markup(head: &[u8]) -> Option<MediaType> {
    let mut body = trim_prolog(head);
    // HTML files often open with a comment before the doctype.
    while let Some(rest) = body.strip_prefix(b"<!--") {
        let end = memchr::memmem::find(rest, b"-->")?;
        body = trim_prolog(&rest[end + 3..]);
    }
    if HTML_MARKERS.iter().any(|marker| starts_with_ignore_case(body, marker)) {
        return Some(MediaType::new("text", "html"));
    }
    if body.starts_with(b"<?xml") {
        if memchr::memmem::find(head, b"<svg").is_some() {
            return Some(MediaType::new("image", "svg+xml"));
        }
        if memchr::memmem::find(head, b"<html").is_some() {
            return Some(MediaType::new("application", "xhtml+xml"));
        }
        return Some(MediaType::new("application", "xml"));
    }
    None
}

/// No NUL bytes, and mostly printable characters, decoded as UTF-8 when
/// valid and as single bytes otherwise.
///
/// UTF-16 text is recognised by its byte order mark. A multi-byte UTF-8
/// sequence cut off at the end of the head does not disqualify it.
pub(super) fn looks_like_text(head: &[u8]) -> bool {
    if head.starts_with(b"\xFF\xFE") || head.starts_with(b"\xFE\xFF") {
        return true;
    }
    if memchr::memchr(0, head).is_some() {
        return false;
    }
    let utf8 = match std::str::from_utf8(head) {
        Ok(s) => Some(s),
        Err(err) if err.error_len().is_none() => std::str::from_utf8(&head[..err.valid_up_to()]).ok(),
        Err(_) => None,
    };
    let (printable, total) = match utf8 {
        Some(s) => (
            s.chars().filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r' | '\x0C')).count(),
            s.chars().count(),
        ),
        None => (
            head.iter()
                .filter(|&&b| matches!(b, b'\t' | b'\n' | b'\r' | 0x0C | 0x20..=0x7E | 0xA0..=0xFF))
                .count(),
            head.len(),
        ),
    };
    printable as f64 >= total as f64 * PRINTABLE_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"<html><body></body></html>", Some("text/html"))]
    #[case(b"\xEF\xBB\xBF\n<!DOCTYPE HTML>", Some("text/html"))]
    #[case(b"<!-- generated -->\n<html>", Some("text/html"))]
    #[case(b"<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>", Some("image/svg+xml"))]
    #[case(b"<?xml version=\"1.0\"?><note/>", Some("application/xml"))]
    #[case(b"just words", None)]
    #[case(b"<!-- unterminated", None)]
    fn markup(#[case] head: &[u8], #[case] expected: Option<&str>) {
        assert_eq!(match_markup(head).map(|t| t.to_string()).as_deref(), expected);
    }

    #[rstest]
    #[case(b"plain ascii\n", true)]
    #[case("héllo wörld".as_bytes(), true)]
    #[case(b"caf\xE9 cr\xE8me", true)]
    #[case(b"\xFF\xFEh\x00i\x00", true)]
    #[case(b"abc\xE2\x82", true)]
    #[case(b"abc\x00def", false)]
    #[case(b"\x01\x02\x03\x04\x05\x06\x07\x08\x0E\x0F", false)]
    fn text_heuristic(#[case] head: &[u8], #[case] expected: bool) {
        assert_eq!(looks_like_text(head), expected);
    }
}
