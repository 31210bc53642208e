//! Raster image dimensions from the file header.

use exn::ResultExt;

use crate::error::{ErrorKind, Result};
use crate::media::MediaType;
use crate::metadata::{self, Metadata};

pub(super) fn parse(data: &[u8], media_type: &MediaType, metadata: &mut Metadata) -> Result<()> {
    let format = media_type.sub_type();
    let size =
        imagesize::blob_size(data).or_raise(|| ErrorKind::malformed(format_name(format), "unreadable header"))?;
    metadata.set(metadata::WIDTH, size.width.to_string());
    metadata.set(metadata::HEIGHT, size.height.to_string());
    if let Some(bit_depth) = bit_depth(format, data) {
        metadata.set(metadata::BIT_DEPTH, bit_depth.to_string());
    }
    Ok(())
}

fn format_name(sub_type: &str) -> &'static str {
    match sub_type {
        "png" => "png",
        "gif" => "gif",
        "bmp" => "bmp",
        "jpeg" => "jpeg",
        "tiff" => "tiff",
        "webp" => "webp",
        _ => "image",
    }
}

/// PNG keeps it in IHDR; BMP in the info header, at a different offset for
/// the OS/2 core header.
fn bit_depth(sub_type: &str, data: &[u8]) -> Option<u32> {
    match sub_type {
        "png" => data.get(24).copied().map(u32::from),
        "bmp" => {
            let header_size = u32::from_le_bytes(data.get(14..18)?.try_into().ok()?);
            let offset = if header_size == 12 { 24 } else { 28 };
            let depth = u16::from_le_bytes(data.get(offset..offset + 2)?.try_into().ok()?);
            Some(u32::from(depth))
        },
        _ => None,
    }
}
