//! Unix `ar` archives, with GNU (`//` table) and BSD (`#1/len`) long names.

use std::io::Read;

use exn::{OptionExt, ResultExt};

use crate::error::{ErrorKind, Result};
use crate::{ArchiveEntry, EntryReader, NAME_LIMIT, NAME_TABLE_LIMIT, read_declared, read_full, skip};

const GLOBAL_HEADER: &[u8] = b"!<arch>\n";
const MEMBER_HEADER_LEN: usize = 60;
const MEMBER_TERMINATOR: &[u8] = b"`\n";
const BSD_LONG_NAME: &[u8] = b"#1/";

pub(crate) struct ArReader<R> {
    reader: R,
    started: bool,
    long_names: Vec<u8>,
}

impl<R: Read> ArReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self { reader, started: false, long_names: Vec::new() }
    }

    fn long_name(&self, offset: &[u8]) -> Result<String> {
        let offset: usize = parse_decimal(offset)?;
        let table = self
            .long_names
            .get(offset..)
            .ok_or_raise(|| ErrorKind::corrupt("long name offset outside the name table"))?;
        let end = table.iter().position(|&b| b == b'\n').unwrap_or(table.len());
        let name = &table[..end];
        Ok(String::from_utf8_lossy(name.strip_suffix(b"/").unwrap_or(name)).into_owned())
    }
}

fn parse_decimal(field: &[u8]) -> Result<usize> {
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_raise(|| ErrorKind::corrupt("malformed numeric field in ar header"))
}

fn is_symbol_table(name: &[u8]) -> bool {
    matches!(name, b"/" | b"/SYM64/") || name.starts_with(b"__.SYMDEF")
}

impl<R: Read> EntryReader for ArReader<R> {
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        if !self.started {
            let mut magic = [0u8; GLOBAL_HEADER.len()];
            self.reader.read_exact(&mut magic).or_raise(|| ErrorKind::corrupt("truncated ar header"))?;
            if magic != GLOBAL_HEADER {
                exn::bail!(ErrorKind::corrupt("missing !<arch> magic"));
            }
            self.started = true;
        }
        loop {
            let mut header = [0u8; MEMBER_HEADER_LEN];
            if !read_full(&mut self.reader, &mut header)? {
                return Ok(None);
            }
            if &header[58..60] != MEMBER_TERMINATOR {
                exn::bail!(ErrorKind::corrupt("bad ar member header terminator"));
            }
            let size = parse_decimal(&header[48..58])?;
            // Member data is padded to an even offset.
            let padded = size + (size & 1);
            let raw_name = header[..16].trim_ascii_end();

            if raw_name == b"//" {
                self.long_names = read_declared(&mut self.reader, size as u64, NAME_TABLE_LIMIT, "name table")?;
                skip(&mut self.reader, (padded - size) as u64)?;
                continue;
            }
            let name = if let Some(length) = raw_name.strip_prefix(BSD_LONG_NAME) {
                let length = parse_decimal(length)?;
                let name = read_declared(&mut self.reader, length as u64, NAME_LIMIT, "long name")?;
                skip(&mut self.reader, padded.saturating_sub(length) as u64)?;
                let name = name.split(|&b| b == 0).next().unwrap_or_default();
                if is_symbol_table(name) {
                    continue;
                }
                String::from_utf8_lossy(name).into_owned()
            } else {
                skip(&mut self.reader, padded as u64)?;
                if is_symbol_table(raw_name) {
                    continue;
                }
                match raw_name.strip_prefix(b"/") {
                    Some(offset) if !offset.is_empty() && offset.iter().all(u8::is_ascii_digit) => {
                        self.long_name(offset)?
                    },
                    _ => String::from_utf8_lossy(raw_name.strip_suffix(b"/").unwrap_or(raw_name)).into_owned(),
                }
            };
            return Ok(Some(ArchiveEntry::new(name, false)));
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Builds an archive from `(header name, data)` members; names are written
    /// verbatim so tests can produce GNU and BSD variants.
    pub fn ar(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = b"!<arch>\n".to_vec();
        for (name, data) in members {
            out.extend_from_slice(format!("{name:<16}{:<12}{:<6}{:<6}{:<8}{:<10}`\n", 0, 0, 0, 644, data.len()).as_bytes());
            out.extend_from_slice(data);
            if data.len() % 2 == 1 {
                out.push(b'\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::ar;
    use super::*;
    use rstest::rstest;
    use std::io::{self, Cursor};

    fn names(data: Vec<u8>) -> Result<Vec<String>> {
        let mut reader = ArReader::new(Cursor::new(data));
        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry()? {
            names.push(entry.path().to_string());
        }
        Ok(names)
    }

    #[test]
    fn gnu_names() {
        let data = ar(&[
            ("/", b"\x00\x00\x00\x00".as_slice()),
            ("//", b"a_very_long_object_file_name.o/\n".as_slice()),
            ("short.o/", b"odd".as_slice()),
            ("/0", b"data".as_slice()),
        ]);
        assert_eq!(names(data).unwrap(), vec!["short.o", "a_very_long_object_file_name.o"]);
    }

    #[test]
    fn bsd_names() {
        let data = ar(&[
            ("#1/20", b"__.SYMDEF SORTED\x00\x00\x00\x00".as_slice()),
            ("#1/28", b"another_long_object_name.o\x00\x00payload".as_slice()),
            ("plain.o", b"x".as_slice()),
        ]);
        assert_eq!(names(data).unwrap(), vec!["another_long_object_name.o", "plain.o"]);
    }

    #[test]
    fn empty_archive() {
        assert!(names(b"!<arch>\n".to_vec()).unwrap().is_empty());
    }

    #[test]
    fn truncated_member() {
        let mut data = ar(&[("first.o/", b"12".as_slice()), ("second.o/", b"3456".as_slice())]);
        data.truncate(data.len() - 2);
        let mut reader = ArReader::new(Cursor::new(data));
        assert_eq!(reader.next_entry().unwrap().unwrap().path(), "first.o");
        let err = reader.next_entry().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Corrupt(_)));
    }

    fn with_declared_size(name: &str, size: u64, data: &[u8]) -> Vec<u8> {
        let mut out = b"!<arch>\n".to_vec();
        out.extend_from_slice(format!("{name:<16}{:<12}{:<6}{:<6}{:<8}{size:<10}`\n", 0, 0, 0, 644).as_bytes());
        out.extend_from_slice(data);
        out
    }

    #[rstest]
    #[case(with_declared_size("//", 9_999_999_999, b"x.o/\n"))]
    #[case(with_declared_size("//", 4096, b"x.o/\n"))]
    #[case(with_declared_size("#1/9999999", 9_999_999, b"name"))]
    #[case(with_declared_size("#1/64", 64, b"name"))]
    fn oversized_or_truncated_names(#[case] data: Vec<u8>) {
        let err = names(data).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Corrupt(_)));
    }

    #[test]
    fn bad_long_name_offset() {
        let data = ar(&[("//", b"x.o/\n".as_slice()), ("/99", b"".as_slice())]);
        let err = names(data).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Corrupt(_)));
    }

    #[test]
    fn failing_reader_is_an_error() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }
        assert!(ArReader::new(Failing).next_entry().is_err());
    }
}
