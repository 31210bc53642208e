//! Zip listing: from local headers front to back, or from the central
//! directory when the source can seek.

use std::io::{Read, Seek};

use exn::ResultExt;
use tracing::debug;
use zip::result::{ZipError, ZipResult};

use crate::error::{Error, ErrorKind, Result};
use crate::{ArchiveEntry, EntryReader};

fn raise<T>(result: ZipResult<T>, what: &str) -> Result<T> {
    let kind = match &result {
        Err(ZipError::Io(_)) => ErrorKind::Io,
        Err(ZipError::UnsupportedArchive(reason)) => ErrorKind::Unsupported(reason.to_string()),
        _ => ErrorKind::corrupt(format!("invalid zip {what}")),
    };
    result.or_raise(|| kind)
}

/// Walks local file headers as they appear in the stream. Entries whose sizes
/// are only known from a trailing data descriptor can't be skipped, and end
/// the listing with an error.
pub(crate) struct ZipReader<R> {
    reader: R,
}

impl<R: Read> ZipReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> EntryReader for ZipReader<R> {
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        let next = raise(zip::read::read_zipfile_from_stream(&mut self.reader), "local file header")?;
        // Dropping the entry skips over its data.
        Ok(next.map(|file| ArchiveEntry::new(file.name(), file.is_dir())))
    }
}

/// Entries as recorded in the central directory, which also knows the ones
/// whose sizes only follow their data.
pub(crate) struct CentralDirectory {
    entries: std::vec::IntoIter<ArchiveEntry>,
    error: Option<Error>,
}

impl CentralDirectory {
    /// `None` when there is no readable central directory, as in a truncated
    /// file.
    pub(crate) fn read<R: Read + Seek>(reader: R) -> Option<Self> {
        let mut archive = match zip::ZipArchive::new(reader) {
            Ok(archive) => archive,
            Err(err) => {
                debug!(error = %err, "No usable zip central directory");
                return None;
            },
        };
        let mut entries = Vec::with_capacity(archive.len());
        let mut error = None;
        for index in 0..archive.len() {
            match raise(archive.by_index_raw(index), "central directory entry") {
                Ok(file) => entries.push(ArchiveEntry::new(file.name(), file.is_dir())),
                Err(err) => {
                    error = Some(err);
                    break;
                },
            }
        }
        Some(Self { entries: entries.into_iter(), error })
    }
}

impl EntryReader for CentralDirectory {
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        match (self.entries.next(), self.error.take()) {
            (Some(entry), error) => {
                self.error = error;
                Ok(Some(entry))
            },
            (None, Some(err)) => Err(err),
            (None, None) => Ok(None),
        }
    }
}
