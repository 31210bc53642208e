//! Utilities for cutting oversized HTML before it is handed to the DOM parser.

use memchr::memrchr;

/// Largest HTML document, in bytes, that is parsed into a DOM.
pub const HTML_PARSE_LIMIT: usize = 4 * 1024 * 1024;

/// Cuts `html` to at most `max_bytes`, backing off so the result doesn't end
/// inside a tag or a character reference.
///
/// Works on bytes: the markers searched for are ASCII, so input in any
/// ASCII-compatible encoding is handled.
///
/// ```rust
/// use delve_detect::safe_html_truncate;
/// let html = b"<p>caf&eacute;</p>";
/// assert_eq!(safe_html_truncate(html, 100), html);
/// assert_eq!(safe_html_truncate(html, 9), b"<p>caf");
/// assert_eq!(safe_html_truncate(html, 16), b"<p>caf&eacute;");
/// ```
pub fn safe_html_truncate(html: &[u8], max_bytes: usize) -> &[u8] {
    if html.len() <= max_bytes {
        return html;
    }
    let candidate = &html[..max_bytes];
    if let Some(open) = memrchr(b'<', candidate)
        && memrchr(b'>', candidate).is_none_or(|close| close < open)
    {
        // Inside a tag: cut before the '<'.
        return &candidate[..open];
    }
    if let Some(amp) = memrchr(b'&', candidate)
        && memrchr(b';', candidate).is_none_or(|semi| semi < amp)
    {
        // Inside an entity: cut before the '&'.
        return &candidate[..amp];
    }
    candidate
}
