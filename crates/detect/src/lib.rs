//! Content inspection: media type detection, metadata and text extraction, and
//! language identification.
//!
//! Each capability sits behind a small trait ([`Detector`], [`Parser`],
//! [`LanguageIdentifier`]) with a lightweight default implementation:
//!
//! ```rust
//! use std::io::Cursor;
//! use delve_detect::{AutoDetectParser, ContentBuffer, Detector, MagicDetector, Metadata, Parser};
//!
//! let html = b"<html><head><title>Hi</title></head><body>Hello</body></html>";
//! let mut metadata = Metadata::new();
//! let mut content = ContentBuffer::new();
//! AutoDetectParser::default().parse(&mut Cursor::new(html), &mut metadata, &mut content).unwrap();
//! assert_eq!(metadata.get("title"), Some("Hi"));
//!
//! let media_type = MagicDetector::new().detect(html, &metadata);
//! assert_eq!(media_type.to_string(), "text/html; charset=UTF-8");
//! ```

mod consts;
mod content;
mod detect;
pub mod error;
mod lang;
mod media;
pub mod metadata;
mod parse;
mod truncate;

pub use crate::content::{ContentBuffer, DEFAULT_CONTENT_LIMIT};
pub use crate::detect::{Detector, HEAD_LEN, MagicDetector};
pub use crate::lang::{LanguageGuess, LanguageIdentifier, StopwordIdentifier, language_name};
pub use crate::media::MediaType;
pub use crate::metadata::Metadata;
pub use crate::parse::{AutoDetectParser, DEFAULT_MAX_READ_BYTES, Parser};
pub use crate::truncate::{HTML_PARSE_LIMIT, safe_html_truncate};
