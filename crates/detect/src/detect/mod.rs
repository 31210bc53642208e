//! Media type detection from leading bytes, refined by metadata hints.

mod magic;
mod text;

use std::path::Path;

use tracing::debug;

use crate::media::MediaType;
use crate::metadata::{self, Metadata};

/// Number of leading bytes [`MagicDetector`] wants to see.
///
/// Enough for the tar header magic at offset 257 and the first local header of
/// a zip based document format.
pub const HEAD_LEN: usize = 8 * 1024;

/// Content type detection service.
pub trait Detector {
    /// Detects the media type of a stream from its first bytes. `hint` carries
    /// whatever metadata is already known about the stream.
    fn detect(&self, head: &[u8], hint: &Metadata) -> MediaType;
}

/// Signature based detector.
///
/// Tries magic byte signatures first, then falls back to a text heuristic.
/// Metadata hints only ever refine the result:
/// - `Content-Type` with the same base type contributes its parameters, and a
///   more specific `text/*` type replaces `text/plain`.
/// - `resourceName` refines `text/plain` by file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicDetector;

impl MagicDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detection from content alone.
    pub fn sniff(&self, head: &[u8]) -> MediaType {
        if let Some(media_type) = magic::match_signature(head) {
            return media_type;
        }
        if let Some(media_type) = text::match_markup(head) {
            return media_type;
        }
        if text::looks_like_text(head) {
            return MediaType::text_plain();
        }
        MediaType::octet_stream()
    }
}

impl Detector for MagicDetector {
    fn detect(&self, head: &[u8], hint: &Metadata) -> MediaType {
        let mut detected = self.sniff(head);
        if let Some(declared) = hint.get(metadata::CONTENT_TYPE).and_then(|s| s.parse::<MediaType>().ok()) {
            if declared.same_base(&detected) {
                detected.merge_parameters(&declared);
            } else if detected.is("text", "plain") && declared.main_type() == "text" {
                debug!(detected = %detected, declared = %declared, "Preferring declared text type");
                let mut replaced = declared;
                replaced.merge_parameters(&detected);
                detected = replaced;
            }
        }
        if detected.is("text", "plain")
            && let Some(name) = hint.get(metadata::RESOURCE_NAME)
            && let Some((main, sub)) = by_extension(name)
        {
            debug!(name, "Refining text type by file name");
            detected = detected.rebase(main, sub);
        }
        detected
    }
}

fn by_extension(name: &str) -> Option<(&'static str, &'static str)> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    Some(match extension.as_str() {
        "csv" => ("text", "csv"),
        "tsv" => ("text", "tab-separated-values"),
        "json" => ("application", "json"),
        "md" | "markdown" => ("text", "markdown"),
        "xml" => ("application", "xml"),
        "html" | "htm" => ("text", "html"),
        "css" => ("text", "css"),
        "js" | "mjs" => ("text", "javascript"),
        _ => return None,
    })
}
