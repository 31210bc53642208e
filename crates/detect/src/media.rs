//! Internet media types (`main/sub; key=value`).

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use exn::OptionExt;

use crate::error::{Error, ErrorKind, Result};

/// A parsed media type.
///
/// Type, subtype and parameter names are lower-cased on construction;
/// parameter values keep their case. Parameters are kept in name order so the
/// rendered form is stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaType {
    main: String,
    sub: String,
    parameters: BTreeMap<String, String>,
}

impl MediaType {
    pub fn new(main: impl AsRef<str>, sub: impl AsRef<str>) -> Self {
        Self {
            main: main.as_ref().to_ascii_lowercase(),
            sub: sub.as_ref().to_ascii_lowercase(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    pub fn text_plain() -> Self {
        Self::new("text", "plain")
    }

    /// Builder-style parameter setter.
    pub fn with_parameter(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set_parameter(name, value);
        self
    }

    pub fn set_parameter(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.parameters.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn main_type(&self) -> &str {
        &self.main
    }

    pub fn sub_type(&self) -> &str {
        &self.sub
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// The `main/sub` form without parameters.
    pub fn base(&self) -> String {
        format!("{}/{}", self.main, self.sub)
    }

    pub fn is(&self, main: &str, sub: &str) -> bool {
        self.main == main && self.sub == sub
    }

    pub fn same_base(&self, other: &Self) -> bool {
        self.main == other.main && self.sub == other.sub
    }

    /// Copies every parameter of `other` into `self`, overwriting on conflict.
    pub fn merge_parameters(&mut self, other: &Self) {
        for (name, value) in &other.parameters {
            self.parameters.insert(name.clone(), value.clone());
        }
    }

    /// Replaces the base type, keeping parameters.
    pub(crate) fn rebase(mut self, main: &str, sub: &str) -> Self {
        self.main = main.to_ascii_lowercase();
        self.sub = sub.to_ascii_lowercase();
        self
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main, self.sub)?;
        for (name, value) in &self.parameters {
            if needs_quoting(value) {
                write!(f, "; {name}=\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
            } else {
                write!(f, "; {name}={value}")?;
            }
        }
        Ok(())
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty() || value.chars().any(|c| c.is_whitespace() || matches!(c, ';' | '"' | ',' | '=' | '\\'))
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | ';' | '"'))
}

/// Splits on `;` outside of quoted strings.
fn split_parameters(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                parts.push(&s[start..i]);
                start = i + 1;
            },
            _ => {},
        }
    }
    parts.push(&s[start..]);
    parts
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\'
                    && let Some(next) = chars.next()
                {
                    out.push(next);
                } else {
                    out.push(c);
                }
            }
            out
        },
        None => value.to_string(),
    }
}

impl FromStr for MediaType {
    type Err = Error;

    /// Parses `main/sub; name=value; ...`. Empty parameter segments are
    /// ignored, as are parameters without a `=`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ErrorKind::InvalidMediaType(s.to_string());
        let mut parts = split_parameters(s).into_iter();
        let base = parts.next().map(str::trim).unwrap_or_default();
        let (main, sub) = base.split_once('/').ok_or_raise(invalid)?;
        let (main, sub) = (main.trim(), sub.trim());
        if !is_token(main) || !is_token(sub) {
            exn::bail!(invalid());
        }
        let mut media_type = Self::new(main, sub);
        for part in parts {
            let Some((name, value)) = part.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if !is_token(name) {
                continue;
            }
            media_type.set_parameter(name, unquote(value.trim()));
        }
        Ok(media_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("text/plain", "text", "plain", 0)]
    #[case("TEXT/HTML; Charset=UTF-8", "text", "html", 1)]
    #[case("application/zip;", "application", "zip", 0)]
    #[case("multipart/form-data; boundary=\"a;b\"; charset=ascii", "multipart", "form-data", 2)]
    fn parse_media_type(#[case] input: &str, #[case] main: &str, #[case] sub: &str, #[case] params: usize) {
        let media_type: MediaType = input.parse().unwrap();
        assert_eq!(media_type.main_type(), main);
        assert_eq!(media_type.sub_type(), sub);
        assert_eq!(media_type.parameters().len(), params);
    }

    #[rstest]
    #[case("")]
    #[case("text")]
    #[case("text/")]
    #[case("/plain")]
    #[case("te xt/plain")]
    fn parse_invalid_media_type(#[case] input: &str) {
        let err = input.parse::<MediaType>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidMediaType(_)));
    }

    #[test]
    fn parameter_values_keep_case_and_are_unquoted() {
        let media_type: MediaType = "text/html; CHARSET=\"Windows-1252\"".parse().unwrap();
        assert_eq!(media_type.parameter("charset"), Some("Windows-1252"));
        assert_eq!(media_type.to_string(), "text/html; charset=Windows-1252");
    }

    #[test]
    fn display_quotes_when_needed() {
        let media_type = MediaType::new("multipart", "mixed").with_parameter("boundary", "a b");
        assert_eq!(media_type.to_string(), "multipart/mixed; boundary=\"a b\"");
        assert_eq!(media_type.base(), "multipart/mixed");
    }

    #[test]
    fn merge_and_rebase() {
        let mut detected = MediaType::text_plain();
        let hint: MediaType = "text/plain; charset=UTF-8".parse().unwrap();
        detected.merge_parameters(&hint);
        assert!(detected.has_parameters());
        let rebased = detected.rebase("text", "csv");
        assert_eq!(rebased.to_string(), "text/csv; charset=UTF-8");
    }
}
