//! cpio archives in the portable ASCII formats: `newc` (070701), `crc`
//! (070702) and `odc` (070707).

use std::io::Read;

use exn::{OptionExt, ResultExt};

use crate::error::{ErrorKind, Result};
use crate::{ArchiveEntry, EntryReader, NAME_LIMIT, read_declared, read_full, skip};

const TRAILER: &[u8] = b"TRAILER!!!";
const MODE_TYPE_MASK: u32 = 0o170000;
const MODE_DIRECTORY: u32 = 0o040000;

/// Header layout of one ASCII variant, after the six byte magic.
struct Layout {
    len: usize,
    radix: u32,
    mode: (usize, usize),
    file_size: (usize, usize),
    name_size: (usize, usize),
    /// Header, name and data are each padded to this alignment.
    align: u64,
}

const NEWC: Layout = Layout { len: 104, radix: 16, mode: (8, 16), file_size: (48, 56), name_size: (88, 96), align: 4 };
const ODC: Layout = Layout { len: 70, radix: 8, mode: (12, 18), file_size: (59, 70), name_size: (53, 59), align: 1 };

fn padding(offset: u64, align: u64) -> u64 {
    (align - offset % align) % align
}

impl Layout {
    fn field(&self, header: &[u8], (start, end): (usize, usize)) -> Result<u64> {
        std::str::from_utf8(&header[start..end])
            .ok()
            .and_then(|s| u64::from_str_radix(s, self.radix).ok())
            .ok_or_raise(|| ErrorKind::corrupt("malformed numeric field in cpio header"))
    }
}

pub(crate) struct CpioReader<R> {
    reader: R,
    done: bool,
}

impl<R: Read> CpioReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self { reader, done: false }
    }
}

impl<R: Read> EntryReader for CpioReader<R> {
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        if self.done {
            return Ok(None);
        }
        let mut magic = [0u8; 6];
        // A stream that ends on an entry boundary without a trailer is accepted.
        if !read_full(&mut self.reader, &mut magic)? {
            self.done = true;
            return Ok(None);
        }
        let layout = match &magic {
            b"070701" | b"070702" => &NEWC,
            b"070707" => &ODC,
            _ if magic.starts_with(b"\xC7\x71") || magic.starts_with(b"\x71\xC7") => {
                exn::bail!(ErrorKind::Unsupported("binary cpio".to_string()))
            },
            _ => exn::bail!(ErrorKind::corrupt("bad cpio magic")),
        };
        let mut header = vec![0; layout.len];
        self.reader.read_exact(&mut header).or_raise(|| ErrorKind::corrupt("truncated cpio header"))?;
        let mode = layout.field(&header, layout.mode)?;
        let file_size = layout.field(&header, layout.file_size)?;
        let name_size = layout.field(&header, layout.name_size)?;

        let name = read_declared(&mut self.reader, name_size, NAME_LIMIT, "cpio name")?;
        let header_len = 6 + layout.len as u64 + name_size;
        skip(&mut self.reader, padding(header_len, layout.align))?;
        skip(&mut self.reader, file_size + padding(file_size, layout.align))?;

        let name = name.split(|&b| b == 0).next().unwrap_or_default();
        if name == TRAILER {
            self.done = true;
            return Ok(None);
        }
        let is_dir = (mode as u32) & MODE_TYPE_MASK == MODE_DIRECTORY;
        Ok(Some(ArchiveEntry::new(String::from_utf8_lossy(name), is_dir)))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// `(path, mode, data)` members in `newc` format, with trailer.
    pub fn newc(members: &[(&str, u32, &[u8])]) -> Vec<u8> {
        fn pad(out: &mut Vec<u8>) {
            while out.len() % 4 != 0 {
                out.push(0);
            }
        }
        let mut out = Vec::new();
        let trailer = [("TRAILER!!!", 0, b"".as_slice())];
        for (i, (path, mode, data)) in members.iter().chain(trailer.iter()).enumerate() {
            let fields = [i as u32, *mode, 0, 0, 1, 0, data.len() as u32, 0, 0, 0, 0, path.len() as u32 + 1, 0];
            out.extend_from_slice(b"070701");
            for field in fields {
                out.extend_from_slice(format!("{field:08X}").as_bytes());
            }
            out.extend_from_slice(path.as_bytes());
            out.push(0);
            pad(&mut out);
            out.extend_from_slice(data);
            pad(&mut out);
        }
        out
    }

    /// `(path, mode, data)` members in `odc` format, with trailer.
    pub fn odc(members: &[(&str, u32, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        let trailer = [("TRAILER!!!", 0, b"".as_slice())];
        for (path, mode, data) in members.iter().chain(trailer.iter()) {
            out.extend_from_slice(
                format!("070707{:06o}{:06o}{:06o}{:06o}{:06o}{:06o}{:06o}{:011o}{:06o}{:011o}", 0, 0, mode, 0, 0, 1, 0, 0, path.len() + 1, data.len())
                    .as_bytes(),
            );
            out.extend_from_slice(path.as_bytes());
            out.push(0);
            out.extend_from_slice(data);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{newc, odc};
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    fn entries(data: Vec<u8>) -> Result<Vec<(String, bool)>> {
        let mut reader = CpioReader::new(Cursor::new(data));
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry()? {
            entries.push((entry.path().to_string(), entry.is_dir()));
        }
        Ok(entries)
    }

    const MEMBERS: &[(&str, u32, &[u8])] =
        &[(".", 0o040755, b""), ("./docs", 0o040755, b""), ("./docs/readme.txt", 0o100644, b"hello")];

    #[rstest]
    #[case(newc(MEMBERS))]
    #[case(odc(MEMBERS))]
    fn lists_entries(#[case] data: Vec<u8>) {
        assert_eq!(
            entries(data).unwrap(),
            vec![(".".to_string(), true), ("./docs".to_string(), true), ("./docs/readme.txt".to_string(), false)]
        );
    }

    #[test]
    fn stops_at_trailer() {
        let mut data = newc(&[("a", 0o100644, b"x")]);
        data.extend_from_slice(b"garbage after the trailer");
        assert_eq!(entries(data).unwrap().len(), 1);
    }

    #[test]
    fn binary_cpio_is_unsupported() {
        let err = entries(b"\xC7\x71\x00\x00\x00\x00\x00\x00".to_vec()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unsupported(_)));
    }

    #[test]
    fn oversized_name_is_refused() {
        let mut data = newc(&[("a", 0o100644, b"x")]);
        data[94..102].copy_from_slice(b"FFFFFFFF");
        let err = entries(data).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Corrupt(_)));
    }

    #[test]
    fn truncated_data() {
        let mut data = newc(&[("big.bin", 0o100644, &[7u8; 64])]);
        data.truncate(150);
        let err = entries(data).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Corrupt(_)));
    }
}
