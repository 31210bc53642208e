//! PDF: version, document information, page count and text operators.
//!
//! This is a byte-level scan, not a PDF object parser. Objects inside
//! compressed object streams are not looked at, and text drawn through
//! composite fonts comes out in whatever byte encoding the font uses.

use std::borrow::Cow;
use std::io::Read;

use exn::{OptionExt, ResultExt};
use flate2::read::ZlibDecoder;
use memchr::memmem;
use tracing::debug;

use crate::consts;
use crate::content::ContentBuffer;
use crate::error::{ErrorKind, Result};
use crate::metadata::{self, Metadata};

/// How far from the end of the file `%%EOF` may sit.
const TRAILER_WINDOW: usize = 1024;
/// How far back from a `stream` keyword its dictionary is looked for.
const DICTIONARY_WINDOW: usize = 2048;
const MAX_INFLATED_STREAM: u64 = 8 * 1024 * 1024;
const UNSUPPORTED_FILTERS: &[&[u8]] = &[
    b"/ASCII85Decode",
    b"/ASCIIHexDecode",
    b"/LZWDecode",
    b"/RunLengthDecode",
    b"/CCITTFaxDecode",
    b"/JBIG2Decode",
    b"/DCTDecode",
    b"/JPXDecode",
    b"/Crypt",
];

pub(super) fn parse(data: &[u8], metadata: &mut Metadata, content: &mut ContentBuffer) -> Result<()> {
    let version = consts::PDF_VERSION_REGEX
        .captures(data)
        .and_then(|caps| caps.get(1))
        .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
        .ok_or_raise(|| ErrorKind::malformed("pdf", "missing %PDF- header"))?;
    metadata.set(metadata::PDF_VERSION, version);

    let tail = &data[data.len().saturating_sub(TRAILER_WINDOW)..];
    if memmem::rfind(tail, b"%%EOF").is_none() {
        exn::bail!(ErrorKind::malformed("pdf", "missing %%EOF trailer"));
    }

    for caps in consts::PDF_INFO_REGEX.captures_iter(info_dictionary(data)) {
        let value = decode_string(&caps[2]);
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match &caps[1] {
            b"Title" => {
                metadata.set(metadata::TITLE, value);
                metadata.set(metadata::DC_TITLE, value);
            },
            b"Author" => {
                metadata.set(metadata::AUTHOR, value);
                metadata.set(metadata::DC_CREATOR, value);
            },
            b"Producer" => metadata.set(metadata::PRODUCER, value),
            b"Creator" => metadata.set(metadata::CREATOR_TOOL, value),
            _ => {},
        }
    }

    if let Some(pages) = page_count(data) {
        metadata.set(metadata::PAGE_COUNT, pages.to_string());
    }
    extract_text(data, content);
    Ok(())
}

/// The trailer's `/Info` object, or the whole file when it can't be found.
fn info_dictionary(data: &[u8]) -> &[u8] {
    let Some(caps) = consts::PDF_INFO_REF_REGEX.captures_iter(data).last() else {
        return data;
    };
    let mut header = caps[1].to_vec();
    header.push(b' ');
    header.extend_from_slice(&caps[2]);
    header.extend_from_slice(b" obj");
    // "1 0 obj" must not match inside "11 0 obj".
    let start = memmem::find_iter(data, &header).find(|&pos| pos == 0 || !data[pos - 1].is_ascii_digit());
    match start {
        Some(start) => {
            let object = &data[start..];
            let end = memmem::find(object, b"endobj").unwrap_or(object.len());
            &object[..end]
        },
        None => data,
    }
}

fn page_count(data: &[u8]) -> Option<usize> {
    let pages = consts::PDF_PAGE_REGEX.find_iter(data).count();
    if pages > 0 {
        return Some(pages);
    }
    consts::PDF_COUNT_REGEX
        .captures_iter(data)
        .filter_map(|caps| std::str::from_utf8(&caps[1]).ok()?.parse::<usize>().ok())
        .max()
        .filter(|&count| count > 0)
}

/// Decodes a literal `( ... )` or hex `< ... >` string.
///
/// Strings with a UTF-16BE byte order mark are decoded as such; anything else
/// is read as single-byte text.
pub(crate) fn decode_string(raw: &[u8]) -> String {
    let bytes = match raw.first() {
        Some(b'(') => unescape_literal(&raw[1..raw.len().saturating_sub(1).max(1)]),
        Some(b'<') => decode_hex(&raw[1..raw.len().saturating_sub(1).max(1)]),
        _ => raw.to_vec(),
    };
    if let Some(utf16) = bytes.strip_prefix(b"\xFE\xFF") {
        let units = utf16.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)).collect();
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn unescape_literal(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        i += 1;
        if b != b'\\' || i >= raw.len() {
            out.push(b);
            continue;
        }
        let escaped = raw[i];
        i += 1;
        match escaped {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'0'..=b'7' => {
                let mut value = u32::from(escaped - b'0');
                for _ in 0..2 {
                    match raw.get(i) {
                        Some(&d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            i += 1;
                        },
                        _ => break,
                    }
                }
                out.push((value & 0xFF) as u8);
            },
            // Line continuation.
            b'\r' => {
                if raw.get(i) == Some(&b'\n') {
                    i += 1;
                }
            },
            b'\n' => {},
            other => out.push(other),
        }
    }
    out
}

fn decode_hex(raw: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = raw
        .iter()
        .filter_map(|&b| char::from(b).to_digit(16))
        .map(|d| d as u8)
        .collect();
    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

struct Stream<'a> {
    dictionary: &'a [u8],
    data: &'a [u8],
}

impl<'a> Stream<'a> {
    fn decoded(&self) -> Option<Cow<'a, [u8]>> {
        if memmem::find(self.dictionary, b"/Filter").is_none() {
            return Some(Cow::Borrowed(self.data));
        }
        let unsupported = UNSUPPORTED_FILTERS
            .iter()
            .any(|filter| memmem::find(self.dictionary, filter).is_some());
        if unsupported || memmem::find(self.dictionary, b"/FlateDecode").is_none() {
            return None;
        }
        let mut inflated = Vec::new();
        match ZlibDecoder::new(self.data)
            .take(MAX_INFLATED_STREAM)
            .read_to_end(&mut inflated)
            .or_raise(|| ErrorKind::malformed("pdf", "corrupt Flate stream"))
        {
            Ok(_) => Some(Cow::Owned(inflated)),
            Err(err) => {
                debug!(error = ?err, "Skipping undecodable stream");
                None
            },
        }
    }
}

/// A direct `/Length` value; indirect references are not resolved.
fn declared_length(dictionary: &[u8]) -> Option<usize> {
    let caps = consts::PDF_LENGTH_REGEX.captures(dictionary)?;
    if caps.get(2).is_some() {
        return None;
    }
    std::str::from_utf8(&caps[1]).ok()?.parse().ok()
}

fn streams(data: &[u8]) -> impl Iterator<Item = Stream<'_>> {
    memmem::find_iter(data, b"stream").filter_map(move |pos| {
        if data[..pos].ends_with(b"end") {
            return None;
        }
        let window = &data[pos.saturating_sub(DICTIONARY_WINDOW)..pos];
        let dictionary = memmem::rfind(window, b"obj").map_or(window, |obj| &window[obj..]);
        let mut start = pos + b"stream".len();
        if data[start..].starts_with(b"\r\n") {
            start += 2;
        } else if data[start..].starts_with(b"\n") || data[start..].starts_with(b"\r") {
            start += 1;
        }
        let declared = declared_length(dictionary)
            .and_then(|length| start.checked_add(length))
            .and_then(|end| data.get(start..end));
        let body = match declared {
            Some(body) => body,
            None => {
                let length = memmem::find(&data[start..], b"endstream")?;
                let body = &data[start..start + length];
                let body = body.strip_suffix(b"\n").unwrap_or(body);
                body.strip_suffix(b"\r").unwrap_or(body)
            },
        };
        Some(Stream { dictionary, data: body })
    })
}

fn extract_text(data: &[u8], content: &mut ContentBuffer) {
    for stream in streams(data) {
        let Some(decoded) = stream.decoded() else {
            continue;
        };
        if memmem::find(&decoded, b"BT").is_none() {
            continue;
        }
        if !text_operators(&decoded, content) {
            return;
        }
    }
}

/// Appends the strings shown by `Tj`, `'` and `TJ`, with a line break after
/// each text object. Returns `false` once the buffer is full.
fn text_operators(stream: &[u8], content: &mut ContentBuffer) -> bool {
    let mut pending_line = false;
    for caps in consts::PDF_TEXT_OP_REGEX.captures_iter(stream) {
        let accepted = if let Some(literal) = caps.get(1) {
            pending_line = true;
            content.push_str(&decode_string(literal.as_bytes()))
        } else if let Some(array) = caps.get(2) {
            pending_line = true;
            consts::PDF_LITERAL_REGEX
                .find_iter(array.as_bytes())
                .all(|literal| content.push_str(&decode_string(literal.as_bytes())))
        } else if pending_line {
            pending_line = false;
            content.push('\n')
        } else {
            true
        };
        if !accepted {
            return false;
        }
    }
    true
}
