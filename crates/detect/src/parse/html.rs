//! HTML: title, `<meta>` pairs, charset and visible body text.

use scraper::{Html, Node};

use crate::consts;
use crate::content::ContentBuffer;
use crate::error::Result;
use crate::media::MediaType;
use crate::metadata::{self, Metadata};
use crate::truncate::{HTML_PARSE_LIMIT, safe_html_truncate};

/// Elements whose text never reaches the reader.
const INVISIBLE: &[&str] = &["script", "style", "noscript", "template", "head"];

pub(super) fn parse(
    data: &[u8],
    media_type: MediaType,
    metadata: &mut Metadata,
    content: &mut ContentBuffer,
) -> Result<()> {
    let (html, decoded_as) = super::decode(safe_html_truncate(data, HTML_PARSE_LIMIT));
    let document = Html::parse_document(&html);

    let charset = declared_charset(&document).unwrap_or_else(|| decoded_as.to_string());
    metadata.set(metadata::CONTENT_TYPE, media_type.with_parameter("charset", charset).to_string());
    if let Some(title) = document
        .select(&consts::TITLE_SELECTOR)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
    {
        metadata.set(metadata::TITLE, title.clone());
        metadata.set(metadata::DC_TITLE, title);
    }
    for meta in document.select(&consts::META_SELECTOR) {
        if let Some(name) = meta.value().attr("name").map(str::trim).filter(|n| !n.is_empty())
            && let Some(value) = meta.value().attr("content")
        {
            metadata.set(name, value.trim());
        }
    }
    for meta in document.select(&consts::META_HTTP_EQUIV_SELECTOR) {
        if let Some(equiv) = meta.value().attr("http-equiv")
            && equiv.eq_ignore_ascii_case("content-language")
            && let Some(value) = meta.value().attr("content")
        {
            metadata.set(metadata::CONTENT_LANGUAGE, value.trim());
        }
    }
    if let Some(lang) = document.select(&consts::HTML_LANG_SELECTOR).next().and_then(|el| el.value().attr("lang")) {
        metadata.set_if_absent(metadata::CONTENT_LANGUAGE, lang.trim());
    }
    collect_text(&document, content);
    Ok(())
}

fn declared_charset(document: &Html) -> Option<String> {
    if let Some(charset) = document
        .select(&consts::META_CHARSET_SELECTOR)
        .find_map(|el| el.value().attr("charset"))
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        return Some(charset.to_string());
    }
    document.select(&consts::META_HTTP_EQUIV_SELECTOR).find_map(|el| {
        let equiv = el.value().attr("http-equiv")?;
        if !equiv.eq_ignore_ascii_case("content-type") {
            return None;
        }
        let declared: MediaType = el.value().attr("content")?.parse().ok()?;
        declared.parameter("charset").map(str::to_string)
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(document: &Html, content: &mut ContentBuffer) {
    let root = document.select(&consts::BODY_SELECTOR).next().unwrap_or_else(|| document.root_element());
    let mut separator = "";
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .any(|ancestor| ancestor.value().as_element().is_some_and(|el| INVISIBLE.contains(&el.name())));
        let text = collapse_whitespace(text);
        if hidden || text.is_empty() {
            continue;
        }
        if !content.push_str(separator) || !content.push_str(&text) {
            break;
        }
        separator = " ";
    }
}
