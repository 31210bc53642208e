//! Compression layer detection for byte streams.
//!
//! Files handed to delve may be wrapped in a compression layer (a `.tar.bz2`
//! is a tarball inside bzip2). [`peel`] looks at the first bytes of a stream,
//! decides which [`Compression`] it carries and returns the decoded stream
//! with its head buffered, ready for the next round of sniffing:
//!
//! ```
//! use std::io::{Cursor, Read};
//! use delve_compress::{Compression, peel};
//!
//! let (compression, mut decoded) = peel(Cursor::new(b"plain text".to_vec())).unwrap();
//! assert_eq!(compression, Compression::None);
//! assert_eq!(decoded.peek(5).unwrap(), b"plain");
//! let mut all = String::new();
//! decoded.into_reader().read_to_string(&mut all).unwrap();
//! assert_eq!(all, "plain text");
//! ```
//!
//! Bzip2 and gzip are always available. XZ and Zstd are behind feature flags.

mod decode;
pub mod error;
mod peek;

use std::fmt::{Display, Formatter, Result as FmtResult};

pub use crate::decode::{MAGIC_LEN, peel};
pub use crate::peek::PeekableReader;

/// A compression layer around a stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Plain data.
    #[default]
    None,
    Bzip2,
    Gzip,
    #[cfg(feature = "xz")]
    Xz,
    #[cfg(feature = "zstd")]
    Zstd,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Bzip2 => "bzip2",
            Compression::Gzip => "gzip",
            #[cfg(feature = "xz")]
            Compression::Xz => "xz",
            #[cfg(feature = "zstd")]
            Compression::Zstd => "zstd",
        }
    }

    /// Whether this is an actual compression layer rather than plain data.
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Compression::None)
    }
}

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
