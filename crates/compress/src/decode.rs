use std::io::Read;

use bzip2::read::MultiBzDecoder;
use exn::ResultExt;
use flate2::read::MultiGzDecoder;
use tracing::{debug, instrument};
#[cfg(feature = "xz")]
use xz2::read::XzDecoder;
#[cfg(feature = "zstd")]
use zstd::stream::read::Decoder as ZstdDecoder;

use crate::Compression;
use crate::error::{ErrorKind, Result};
use crate::peek::PeekableReader;

const BZIP2_MAGIC: &[u8] = b"BZh";
const GZIP_MAGIC: &[u8] = b"\x1F\x8B";
const XZ_MAGIC: &[u8] = b"\xFD7zXZ\x00";
const ZSTD_MAGIC: &[u8] = b"\x28\xB5\x2F\xFD";

/// Longest magic sequence checked by [`Compression::sniff`].
pub const MAGIC_LEN: usize = XZ_MAGIC.len();

impl Compression {
    /// Identifies the compression layer from the first bytes of a stream.
    /// Anything unrecognised is plain data.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::DisabledFormat`] when the bytes carry XZ or Zstd magic
    /// but the matching feature is off.
    pub fn sniff(head: &[u8]) -> Result<Self> {
        if head.starts_with(BZIP2_MAGIC) {
            return Ok(Compression::Bzip2);
        }
        if head.starts_with(GZIP_MAGIC) {
            return Ok(Compression::Gzip);
        }
        if head.starts_with(XZ_MAGIC) {
            #[cfg(feature = "xz")]
            return Ok(Compression::Xz);
            #[cfg(not(feature = "xz"))]
            exn::bail!(ErrorKind::DisabledFormat("xz".to_string()));
        }
        if head.starts_with(ZSTD_MAGIC) {
            #[cfg(feature = "zstd")]
            return Ok(Compression::Zstd);
            #[cfg(not(feature = "zstd"))]
            exn::bail!(ErrorKind::DisabledFormat("zstd".to_string()));
        }
        Ok(Compression::None)
    }

    /// Wraps `reader` in the decoder for this layer. Multi-member gzip and
    /// bzip2 streams are decoded in full.
    pub fn wrap_reader<'a, R: Read + 'a>(&self, reader: R) -> Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => Box::new(reader),
            Compression::Bzip2 => Box::new(MultiBzDecoder::new(reader)),
            Compression::Gzip => Box::new(MultiGzDecoder::new(reader)),
            #[cfg(feature = "xz")]
            Compression::Xz => Box::new(XzDecoder::new(reader)),
            #[cfg(feature = "zstd")]
            Compression::Zstd => Box::new(ZstdDecoder::new(reader).or_raise(|| ErrorKind::Decoder)?),
        })
    }
}

/// Removes one compression layer from `reader`.
///
/// Decoding is lazy: corrupt compressed data surfaces as an
/// [`ErrorKind::InvalidData`] from the first [`PeekableReader::peek`] on the
/// returned reader, not from this call.
#[instrument(skip_all, fields(compression))]
pub fn peel<'a, R: Read + 'a>(reader: R) -> Result<(Compression, PeekableReader<Box<dyn Read + 'a>>)> {
    let mut raw = PeekableReader::new(reader);
    let magic = raw.peek(MAGIC_LEN).or_raise(|| ErrorKind::Io)?;
    let compression = Compression::sniff(magic)?;
    tracing::Span::current().record("compression", tracing::field::display(compression));
    if compression.is_compressed() {
        debug!("Decoding compression layer");
    }
    let decoded = compression.wrap_reader(raw.into_reader())?;
    Ok((compression, PeekableReader::new(decoded)))
}
