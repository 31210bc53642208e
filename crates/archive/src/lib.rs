//! Streaming archive listing.
//!
//! [`Archive::open`] works out the container from content alone. A
//! compression layer (bzip2, gzip, and xz/zstd behind features) is peeled off
//! first, so `.tar.bz2` and friends are listed like plain tarballs. Entries
//! are then read front to back, once, without seeking:
//!
//! ```rust
//! use std::io::Cursor;
//! use delve_archive::Archive;
//!
//! let mut builder = tar::Builder::new(Vec::new());
//! let mut header = tar::Header::new_ustar();
//! header.set_size(5);
//! header.set_mode(0o644);
//! builder.append_data(&mut header, "docs/hello.txt", &b"hello"[..]).unwrap();
//! let tarball = builder.into_inner().unwrap();
//!
//! let mut archive = Archive::open(Cursor::new(tarball), None).unwrap();
//! assert_eq!(archive.names().collect::<Vec<_>>(), vec!["hello.txt"]);
//! ```

mod ar;
mod cpio;
pub mod error;
mod family;
mod format;
mod zip;

use std::io::{self, Read, Seek, SeekFrom};

use delve_compress::Compression;
use exn::{OptionExt, ResultExt};
use tracing::{debug, instrument, warn};

use crate::error::{ErrorKind, Result};
pub use crate::family::{ARCHIVE_SUBTYPES, ArchiveFamily, is_archive_subtype};
pub use crate::format::{Format, SNIFF_LEN};

/// One archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    path: String,
    is_dir: bool,
}

impl ArchiveEntry {
    pub fn new(path: impl Into<String>, is_dir: bool) -> Self {
        Self { path: path.into(), is_dir }
    }

    /// Full path inside the archive, as stored.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir || self.path.ends_with('/')
    }

    /// Last non-empty `/` separated segment of the path.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve_archive::ArchiveEntry;
    /// assert_eq!(ArchiveEntry::new("a/b/c.txt", false).name(), Some("c.txt"));
    /// assert_eq!(ArchiveEntry::new("//", false).name(), None);
    /// ```
    pub fn name(&self) -> Option<&str> {
        self.path.rsplit('/').find(|segment| !segment.is_empty())
    }
}

/// Sequential access to the members of one container format.
trait EntryReader {
    /// `Ok(None)` once the archive is exhausted.
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry>>;
}

enum Container {
    Tar(tar::Archive<Box<dyn Read>>),
    Stream(Box<dyn EntryReader>),
    Empty,
}

/// An archive opened over a byte stream.
pub struct Archive {
    format: Format,
    compression: Compression,
    container: Container,
}

impl Archive {
    /// Opens `reader` as an archive, choosing the reader from content.
    ///
    /// `hint` is the family the caller believes the stream to be. It is only
    /// compared against what the content says, and a disagreement is logged
    /// rather than treated as an error.
    #[instrument(skip(reader), fields(format, compression))]
    pub fn open(reader: impl Read + 'static, hint: Option<ArchiveFamily>) -> Result<Self> {
        let (compression, mut peekable) = delve_compress::peel(reader).or_raise(|| ErrorKind::Compression)?;
        let head = match peekable.peek(SNIFF_LEN) {
            Ok(head) => head,
            Err(err) if compression.is_compressed() => {
                return Err(err).or_raise(|| ErrorKind::corrupt(format!("undecodable {compression} stream")));
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::Io),
        };
        let format = Format::sniff(head).ok_or_raise(|| ErrorKind::Unrecognized)?;
        let empty_zip = format == Format::Zip && head.starts_with(format::ZIP_EMPTY_ARCHIVE);

        compare_hint(format, compression, hint);

        let reader: Box<dyn Read> = Box::new(peekable.into_reader());
        let container = match format {
            Format::Zip if empty_zip => Container::Empty,
            Format::Zip => Container::Stream(Box::new(zip::ZipReader::new(reader))),
            Format::Tar => Container::Tar(tar::Archive::new(reader)),
            Format::Ar => Container::Stream(Box::new(ar::ArReader::new(reader))),
            Format::Cpio => Container::Stream(Box::new(cpio::CpioReader::new(reader))),
        };
        Ok(Self { format, compression, container })
    }

    /// Like [`Archive::open`], except that a zip is listed from its central
    /// directory, which also covers entries whose sizes only follow their
    /// data. A zip without a readable central directory, and every other
    /// format, is read front to back as [`Archive::open`] does.
    #[instrument(skip(reader), fields(format, compression))]
    pub fn open_seekable<R: Read + Seek + 'static>(mut reader: R, hint: Option<ArchiveFamily>) -> Result<Self> {
        let start = reader.stream_position().or_raise(|| ErrorKind::Io)?;
        let mut magic = Vec::with_capacity(4);
        (&mut reader).take(4).read_to_end(&mut magic).or_raise(|| ErrorKind::Io)?;
        reader.seek(SeekFrom::Start(start)).or_raise(|| ErrorKind::Io)?;
        if Format::sniff(&magic) == Some(Format::Zip)
            && let Some(directory) = zip::CentralDirectory::read(&mut reader)
        {
            compare_hint(Format::Zip, Compression::None, hint);
            return Ok(Self {
                format: Format::Zip,
                compression: Compression::None,
                container: Container::Stream(Box::new(directory)),
            });
        }
        reader.seek(SeekFrom::Start(start)).or_raise(|| ErrorKind::Io)?;
        Self::open(reader, hint)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// The compression layer found around the container, if any.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Every entry, directories included. Iteration ends after the first
    /// error. Can be started only once: entries already read are gone.
    pub fn entries(&mut self) -> Result<Entries<'_>> {
        let inner = match &mut self.container {
            Container::Tar(archive) => EntriesInner::Tar(archive.entries().or_raise(|| ErrorKind::Io)?),
            Container::Stream(reader) => EntriesInner::Stream(reader),
            Container::Empty => EntriesInner::Empty,
        };
        Ok(Entries { inner, done: false })
    }

    /// Leaf names of the non-directory entries.
    ///
    /// A failure to read the archive is logged as a warning and ends the
    /// sequence; names already produced stay valid.
    pub fn names(&mut self) -> Names<'_> {
        match self.entries() {
            Ok(entries) => Names { entries: Some(entries) },
            Err(err) => {
                warn!(error = ?err, "Unable to read archive entries");
                Names { entries: None }
            },
        }
    }
}

enum EntriesInner<'a> {
    Tar(tar::Entries<'a, Box<dyn Read>>),
    Stream(&'a mut Box<dyn EntryReader>),
    Empty,
}

/// Iterator over [`ArchiveEntry`] values; see [`Archive::entries`].
pub struct Entries<'a> {
    inner: EntriesInner<'a>,
    done: bool,
}

fn next_tar_entry(entries: &mut tar::Entries<'_, Box<dyn Read>>) -> Result<Option<ArchiveEntry>> {
    for entry in entries.by_ref() {
        let entry = entry.or_raise(|| ErrorKind::corrupt("invalid tar header"))?;
        let kind = entry.header().entry_type();
        if kind.is_pax_global_extensions()
            || kind.is_pax_local_extensions()
            || kind.is_gnu_longname()
            || kind.is_gnu_longlink()
        {
            continue;
        }
        let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        return Ok(Some(ArchiveEntry::new(path, kind.is_dir())));
    }
    Ok(None)
}

impl Iterator for Entries<'_> {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = match &mut self.inner {
            EntriesInner::Tar(entries) => next_tar_entry(entries),
            EntriesInner::Stream(reader) => reader.next_entry(),
            EntriesInner::Empty => Ok(None),
        };
        match next {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(err) => {
                self.done = true;
                Some(Err(err))
            },
        }
    }
}

/// Iterator over leaf names; see [`Archive::names`].
pub struct Names<'a> {
    entries: Option<Entries<'a>>,
}

impl Iterator for Names<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            match self.entries.as_mut()?.next() {
                None => return None,
                Some(Err(err)) => {
                    warn!(error = ?err, "Archive listing stopped early");
                    self.entries = None;
                    return None;
                },
                Some(Ok(entry)) if entry.is_dir() => continue,
                Some(Ok(entry)) => match entry.name() {
                    Some(name) => return Some(name.to_string()),
                    None => debug!(path = entry.path(), "Skipping archive entry without a name"),
                },
            }
        }
    }
}

/// Fills `buf` completely. `Ok(false)` means the stream ended cleanly before
/// the first byte; ending part way through is an error.
/// Records what was found on the current span and logs a disagreement with
/// `hint`.
fn compare_hint(format: Format, compression: Compression, hint: Option<ArchiveFamily>) {
    let span = tracing::Span::current();
    span.record("format", tracing::field::display(format));
    span.record("compression", tracing::field::display(compression));
    if let Some(family) = hint {
        let agrees = format.agrees_with(family) && (!family.is_compression() || compression.is_compressed());
        if !agrees {
            debug!(%family, %format, %compression, "Archive content disagrees with the detected type");
        }
    }
}

pub(crate) fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {},
            Err(err) => return Err(err).or_raise(|| ErrorKind::Io),
        }
    }
    match filled {
        0 => Ok(false),
        n if n == buf.len() => Ok(true),
        _ => exn::bail!(ErrorKind::corrupt("truncated header")),
    }
}

/// Upper bound for a single member name read from a header.
pub(crate) const NAME_LIMIT: u64 = 64 * 1024;
/// Upper bound for a GNU `ar` long name table.
pub(crate) const NAME_TABLE_LIMIT: u64 = 16 * 1024 * 1024;

/// Reads exactly `len` bytes whose size came from a header. The buffer only
/// grows with what is actually read, and a `len` over `limit` is refused
/// before reading anything.
pub(crate) fn read_declared(reader: &mut impl Read, len: u64, limit: u64, what: &str) -> Result<Vec<u8>> {
    if len > limit {
        exn::bail!(ErrorKind::corrupt(format!("{what} of {len} bytes is over the {limit} byte limit")));
    }
    let mut buf = Vec::new();
    reader.take(len).read_to_end(&mut buf).or_raise(|| ErrorKind::Io)?;
    if (buf.len() as u64) < len {
        exn::bail!(ErrorKind::corrupt(format!("truncated {what}")));
    }
    Ok(buf)
}

/// Discards exactly `len` bytes.
pub(crate) fn skip(reader: &mut impl Read, len: u64) -> Result<()> {
    let skipped = io::copy(&mut reader.take(len), &mut io::sink()).or_raise(|| ErrorKind::Io)?;
    if skipped < len {
        exn::bail!(ErrorKind::corrupt("truncated entry data"));
    }
    Ok(())
}
