//! A character-limited text sink for extracted content.

use std::fmt;

/// Default number of characters a [`ContentBuffer`] accepts.
pub const DEFAULT_CONTENT_LIMIT: usize = 100_000;

/// Collects extracted plain text up to a fixed number of characters.
///
/// Writes past the limit are dropped and the buffer remembers that it was
/// truncated; a write is never an error.
#[derive(Debug, Clone)]
pub struct ContentBuffer {
    text: String,
    chars: usize,
    limit: usize,
    truncated: bool,
}

impl Default for ContentBuffer {
    fn default() -> Self {
        Self::with_limit(DEFAULT_CONTENT_LIMIT)
    }
}

impl ContentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { text: String::new(), chars: 0, limit, truncated: false }
    }

    /// Appends as much of `s` as fits. Returns `false` if anything was dropped.
    pub fn push_str(&mut self, s: &str) -> bool {
        let remaining = self.limit - self.chars;
        if remaining == 0 {
            self.truncated |= !s.is_empty();
            return s.is_empty();
        }
        match s.char_indices().nth(remaining) {
            Some((cut, _)) => {
                self.text.push_str(&s[..cut]);
                self.chars = self.limit;
                self.truncated = true;
                false
            },
            None => {
                self.chars += s.chars().count();
                self.text.push_str(s);
                true
            },
        }
    }

    pub fn push(&mut self, c: char) -> bool {
        let mut tmp = [0u8; 4];
        self.push_str(c.encode_utf8(&mut tmp))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.chars == 0
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Write for ContentBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn accepts_until_limit() {
        let mut buffer = ContentBuffer::with_limit(5);
        assert!(buffer.push_str("abc"));
        assert!(!buffer.push_str("défg"));
        assert_eq!(buffer.as_str(), "abcdé");
        assert_eq!(buffer.len(), 5);
        assert!(buffer.is_truncated());
        assert!(!buffer.push('x'));
        assert_eq!(buffer.as_str(), "abcdé");
    }

    #[test]
    fn fmt_write_never_fails() {
        let mut buffer = ContentBuffer::with_limit(3);
        write!(buffer, "{}", 123456).unwrap();
        assert_eq!(buffer.into_string(), "123");
    }

    #[test]
    fn empty_writes_do_not_truncate() {
        let mut buffer = ContentBuffer::with_limit(0);
        assert!(buffer.push_str(""));
        assert!(!buffer.is_truncated());
        assert_eq!(buffer.limit(), 0);
    }
}
