use std::io::{Chain, Cursor, Read};

use exn::ResultExt;

use crate::error::{ErrorKind, Result};

/// A [`Read`]er whose head can be inspected before the whole stream is
/// handed on.
pub struct PeekableReader<R> {
    inner: R,
    head: Vec<u8>,
}

impl<R: Read> PeekableReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, head: Vec::new() }
    }

    /// Returns up to the first `limit` bytes, reading more only when needed.
    /// Shorter streams return everything they contain.
    ///
    /// ```
    /// use std::io::Cursor;
    /// use delve_compress::PeekableReader;
    ///
    /// let mut reader = PeekableReader::new(Cursor::new(b"Hello, world!".to_vec()));
    /// assert_eq!(reader.peek(5).unwrap(), b"Hello");
    /// assert_eq!(reader.peek(100).unwrap(), b"Hello, world!");
    /// assert_eq!(reader.peek(2).unwrap(), b"He");
    /// ```
    pub fn peek(&mut self, limit: usize) -> Result<&[u8]> {
        if self.head.len() < limit {
            let wanted = (limit - self.head.len()) as u64;
            (&mut self.inner).take(wanted).read_to_end(&mut self.head).or_raise(|| ErrorKind::InvalidData)?;
        }
        Ok(&self.head[..self.head.len().min(limit)])
    }

    /// Everything read so far.
    pub fn head(&self) -> &[u8] {
        &self.head
    }

    /// The full stream again: the buffered head, then the rest.
    pub fn into_reader(self) -> Chain<Cursor<Vec<u8>>, R> {
        Cursor::new(self.head).chain(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_head() {
        let mut reader = PeekableReader::new(Cursor::new(b"abcdefgh".to_vec()));
        assert_eq!(reader.peek(3).unwrap(), b"abc");
        assert_eq!(reader.head(), b"abc");
        let mut rest = String::new();
        reader.into_reader().read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "abcdefgh");
    }

    #[test]
    fn empty_stream() {
        let mut reader = PeekableReader::new(std::io::empty());
        assert!(reader.peek(100).unwrap().is_empty());
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn read_errors_surface() {
        let err = PeekableReader::new(Failing).peek(4).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData);
    }
}
