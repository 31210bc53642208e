//! Container format sniffing.

use derive_more::Display;

use crate::family::ArchiveFamily;

/// How much of the (decompressed) stream [`Format::sniff`] wants to see.
pub const SNIFF_LEN: usize = 512;

pub(crate) const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";
pub(crate) const ZIP_EMPTY_ARCHIVE: &[u8] = b"PK\x05\x06";
const AR_MAGIC: &[u8] = b"!<arch>\n";
const CPIO_MAGICS: [&[u8]; 5] = [b"070701", b"070702", b"070707", b"\xC7\x71", b"\x71\xC7"];

/// A container format this crate can enumerate.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    #[display("zip")]
    Zip,
    #[display("tar")]
    Tar,
    #[display("ar")]
    Ar,
    #[display("cpio")]
    Cpio,
}

impl Format {
    /// Identifies the container from the first [`SNIFF_LEN`] bytes.
    pub fn sniff(head: &[u8]) -> Option<Self> {
        if head.starts_with(ZIP_LOCAL_HEADER) || head.starts_with(ZIP_EMPTY_ARCHIVE) {
            return Some(Self::Zip);
        }
        if head.starts_with(AR_MAGIC) {
            return Some(Self::Ar);
        }
        if CPIO_MAGICS.iter().any(|magic| head.starts_with(magic)) {
            return Some(Self::Cpio);
        }
        if is_tar_header(head) {
            return Some(Self::Tar);
        }
        None
    }

    /// `true` if content in this format is what `family` leads one to expect.
    pub(crate) fn agrees_with(&self, family: ArchiveFamily) -> bool {
        match family {
            ArchiveFamily::Zip => *self == Self::Zip,
            ArchiveFamily::Cpio => *self == Self::Cpio,
            ArchiveFamily::Ar => *self == Self::Ar,
            ArchiveFamily::Tar | ArchiveFamily::GnuTar => *self == Self::Tar,
            ArchiveFamily::Bzip | ArchiveFamily::Bzip2 => true,
        }
    }
}

/// POSIX and GNU headers carry `ustar` at offset 257; older headers are
/// recognised by a valid checksum.
fn is_tar_header(head: &[u8]) -> bool {
    let Some(header) = head.get(..512) else {
        return false;
    };
    if &header[257..262] == b"ustar" {
        return true;
    }
    if header[0] == 0 {
        return false;
    }
    let Some(expected) = std::str::from_utf8(&header[148..156])
        .ok()
        .map(|field| field.trim_matches(|c: char| c == '\0' || c == ' '))
        .and_then(|field| u32::from_str_radix(field, 8).ok())
    else {
        return false;
    };
    // The checksum field itself counts as eight spaces.
    let actual: u32 = header
        .iter()
        .enumerate()
        .map(|(i, &b)| if (148..156).contains(&i) { u32::from(b' ') } else { u32::from(b) })
        .sum();
    actual == expected
}
