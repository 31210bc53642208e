//! Archive families as named by detected media subtypes.

use std::fmt::{self, Display, Formatter};

/// Media subtypes that are handed to the archive lister.
///
/// Membership is an exact, case-sensitive match on the subtype alone.
pub const ARCHIVE_SUBTYPES: [&str; 7] = ["zip", "x-cpio", "x-gtar", "x-bzip", "x-bzip2", "x-archive", "x-tar"];

/// The archive family a detected subtype names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFamily {
    Zip,
    Cpio,
    GnuTar,
    Bzip,
    Bzip2,
    Ar,
    Tar,
}

impl ArchiveFamily {
    /// Maps a media subtype (`"zip"`, `"x-tar"`, ...) to its family.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve_archive::ArchiveFamily;
    /// assert_eq!(ArchiveFamily::from_subtype("x-gtar"), Some(ArchiveFamily::GnuTar));
    /// assert_eq!(ArchiveFamily::from_subtype("x-zip"), None);
    /// ```
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        Some(match subtype {
            "zip" => Self::Zip,
            "x-cpio" => Self::Cpio,
            "x-gtar" => Self::GnuTar,
            "x-bzip" => Self::Bzip,
            "x-bzip2" => Self::Bzip2,
            "x-archive" => Self::Ar,
            "x-tar" => Self::Tar,
            _ => return None,
        })
    }

    pub fn subtype(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Cpio => "x-cpio",
            Self::GnuTar => "x-gtar",
            Self::Bzip => "x-bzip",
            Self::Bzip2 => "x-bzip2",
            Self::Ar => "x-archive",
            Self::Tar => "x-tar",
        }
    }

    /// Bzip families name a compression layer; the container inside is
    /// whatever the content says.
    pub fn is_compression(&self) -> bool {
        matches!(self, Self::Bzip | Self::Bzip2)
    }
}

impl Display for ArchiveFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.subtype())
    }
}

/// `true` when `subtype` is one of [`ARCHIVE_SUBTYPES`].
pub fn is_archive_subtype(subtype: &str) -> bool {
    ArchiveFamily::from_subtype(subtype).is_some()
}
