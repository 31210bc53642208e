//! Content parsers: metadata and plain text extraction.

mod html;
mod image;
mod pdf;
mod text;

use std::io::Read;

use exn::ResultExt;
use tracing::{debug, instrument};

use crate::content::ContentBuffer;
use crate::detect::MagicDetector;
use crate::error::{ErrorKind, Result};
use crate::media::MediaType;
use crate::metadata::{self, Metadata};

/// Default upper bound on the bytes a parser reads from one stream.
pub const DEFAULT_MAX_READ_BYTES: u64 = 16 * 1024 * 1024;

/// Content and metadata extraction service.
pub trait Parser {
    /// Parses `reader`, adding whatever metadata it finds to `metadata` and
    /// any extracted plain text to `content`.
    ///
    /// Metadata written before a failure stays in `metadata`.
    fn parse(&self, reader: &mut dyn Read, metadata: &mut Metadata, content: &mut ContentBuffer) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Html,
    Pdf,
    Image,
    Empty,
}

impl Format {
    fn for_type(media_type: &MediaType) -> Self {
        match (media_type.main_type(), media_type.sub_type()) {
            ("text", "html") | ("application", "xhtml+xml") => Self::Html,
            ("application", "pdf") => Self::Pdf,
            ("image", "png" | "gif" | "bmp" | "jpeg" | "tiff" | "webp") => Self::Image,
            ("text", _) | ("application", "xml" | "json") | ("image", "svg+xml") => Self::Text,
            _ => Self::Empty,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Text => "TextParser",
            Self::Html => "HtmlParser",
            Self::Pdf => "PdfParser",
            Self::Image => "ImageParser",
            Self::Empty => "EmptyParser",
        }
    }
}

/// Detects the stream's type from its content, then hands it to the matching
/// format parser.
///
/// Types without a dedicated parser still get `Content-Type` recorded. At most
/// `max_read_bytes` are read; anything beyond is ignored.
#[derive(Debug, Clone)]
pub struct AutoDetectParser {
    detector: MagicDetector,
    max_read_bytes: u64,
}

impl Default for AutoDetectParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_READ_BYTES)
    }
}

impl AutoDetectParser {
    pub fn new(max_read_bytes: u64) -> Self {
        Self { detector: MagicDetector::new(), max_read_bytes }
    }

    pub fn max_read_bytes(&self) -> u64 {
        self.max_read_bytes
    }

    /// Parses an in-memory document.
    pub fn parse_bytes(&self, data: &[u8], metadata: &mut Metadata, content: &mut ContentBuffer) -> Result<()> {
        let media_type = self.detector.sniff(data);
        let format = Format::for_type(&media_type);
        debug!(media_type = %media_type, parser = format.name(), "Parsing");
        metadata.set(metadata::CONTENT_TYPE, media_type.to_string());
        match format {
            Format::Text => text::parse(data, media_type, metadata, content)?,
            Format::Html => html::parse(data, media_type, metadata, content)?,
            Format::Pdf => pdf::parse(data, metadata, content)?,
            Format::Image => image::parse(data, &media_type, metadata)?,
            Format::Empty => {},
        }
        metadata.set(metadata::PARSED_BY, format.name());
        Ok(())
    }
}

impl Parser for AutoDetectParser {
    #[instrument(skip_all, fields(bytes_read))]
    fn parse(&self, reader: &mut dyn Read, metadata: &mut Metadata, content: &mut ContentBuffer) -> Result<()> {
        let mut data = Vec::new();
        reader
            .take(self.max_read_bytes)
            .read_to_end(&mut data)
            .or_raise(|| ErrorKind::Io)?;
        tracing::Span::current().record("bytes_read", data.len());
        self.parse_bytes(&data, metadata, content)
    }
}

/// Decodes `data` as UTF-16 when it starts with a byte order mark, as UTF-8
/// when valid, and as ISO-8859-1 otherwise. Returns the text and the name of
/// the charset used.
pub(crate) fn decode(data: &[u8]) -> (String, &'static str) {
    if let Some(rest) = data.strip_prefix(b"\xEF\xBB\xBF") {
        return (String::from_utf8_lossy(rest).into_owned(), "UTF-8");
    }
    if let Some(rest) = data.strip_prefix(b"\xFF\xFE") {
        return (decode_utf16(rest, u16::from_le_bytes), "UTF-16LE");
    }
    if let Some(rest) = data.strip_prefix(b"\xFE\xFF") {
        return (decode_utf16(rest, u16::from_be_bytes), "UTF-16BE");
    }
    match std::str::from_utf8(data) {
        Ok(text) => (text.to_string(), "UTF-8"),
        // A read limit can split the final character.
        Err(err) if err.error_len().is_none() => {
            (String::from_utf8_lossy(&data[..err.valid_up_to()]).into_owned(), "UTF-8")
        },
        Err(_) => (data.iter().map(|&b| char::from(b)).collect(), "ISO-8859-1"),
    }
}

fn decode_utf16(data: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = data.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case(b"plain".as_slice(), "plain", "UTF-8")]
    #[case(b"\xEF\xBB\xBFbom".as_slice(), "bom", "UTF-8")]
    #[case(b"\xFF\xFEh\x00i\x00".as_slice(), "hi", "UTF-16LE")]
    #[case(b"\xFE\xFF\x00h\x00i".as_slice(), "hi", "UTF-16BE")]
    #[case(b"caf\xE9".as_slice(), "café", "ISO-8859-1")]
    #[case(b"caf\xC3".as_slice(), "caf", "UTF-8")]
    fn decode_charsets(#[case] data: &[u8], #[case] text: &str, #[case] charset: &str) {
        assert_eq!(decode(data), (text.to_string(), charset));
    }

    #[test]
    fn parse_plain_text() {
        let mut metadata = Metadata::new();
        let mut content = ContentBuffer::new();
        AutoDetectParser::default()
            .parse(&mut Cursor::new(b"hello world".to_vec()), &mut metadata, &mut content)
            .unwrap();
        assert_eq!(metadata.get(metadata::CONTENT_TYPE), Some("text/plain; charset=UTF-8"));
        assert_eq!(metadata.get(metadata::PARSED_BY), Some("TextParser"));
        assert_eq!(content.as_str(), "hello world");
    }

    #[test]
    fn parse_unknown_binary_records_type_only() {
        let mut metadata = Metadata::new();
        let mut content = ContentBuffer::new();
        AutoDetectParser::default()
            .parse(&mut Cursor::new(b"\x00\x01\x02\x03".to_vec()), &mut metadata, &mut content)
            .unwrap();
        assert_eq!(metadata.get(metadata::CONTENT_TYPE), Some("application/octet-stream"));
        assert_eq!(metadata.get(metadata::PARSED_BY), Some("EmptyParser"));
        assert!(content.is_empty());
    }

    #[test]
    fn parse_respects_read_limit() {
        let mut metadata = Metadata::new();
        let mut content = ContentBuffer::new();
        AutoDetectParser::new(5)
            .parse(&mut Cursor::new(b"hello world".to_vec()), &mut metadata, &mut content)
            .unwrap();
        assert_eq!(content.as_str(), "hello");
    }

    #[test]
    fn failed_parse_keeps_partial_metadata() {
        let mut metadata = Metadata::new();
        let mut content = ContentBuffer::new();
        let err = AutoDetectParser::default()
            .parse(&mut Cursor::new(b"\x89PNG\r\n\x1a\n\x00\x00".to_vec()), &mut metadata, &mut content)
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::Malformed { format: "png", .. }));
        assert_eq!(metadata.get(metadata::CONTENT_TYPE), Some("image/png"));
        assert!(!metadata.contains(metadata::PARSED_BY));
    }
}
