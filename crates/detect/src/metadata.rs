//! Document metadata container.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const CONTENT_LANGUAGE: &str = "Content-Language";
pub const RESOURCE_NAME: &str = "resourceName";
pub const PARSED_BY: &str = "X-Parsed-By";
pub const TITLE: &str = "title";
pub const DC_TITLE: &str = "dc:title";
pub const AUTHOR: &str = "Author";
pub const DC_CREATOR: &str = "dc:creator";
pub const PRODUCER: &str = "producer";
pub const CREATOR_TOOL: &str = "xmp:CreatorTool";
pub const PDF_VERSION: &str = "pdf:PDFVersion";
pub const PAGE_COUNT: &str = "xmpTPg:NPages";
pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const BIT_DEPTH: &str = "bit-depth";

/// An ordered name to value map, filled in as a side effect of parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Sets `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Sets `name` only when no value is present yet.
    pub fn set_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(name.into()).or_insert_with(|| value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Display for Metadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_set_if_absent_does_not() {
        let mut metadata = Metadata::new();
        assert!(metadata.is_empty());
        metadata.set(TITLE, "First");
        metadata.set(TITLE, "Second");
        metadata.set_if_absent(TITLE, "Third");
        assert_eq!(metadata.get(TITLE), Some("Second"));
        assert_eq!(metadata.len(), 1);
    }

    #[test]
    fn names_are_ordered() {
        let metadata: Metadata = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        assert_eq!(metadata.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(metadata.to_string(), "a=1, b=2, c=3");
    }
}
