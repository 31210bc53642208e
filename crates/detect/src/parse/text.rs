//! Plain text and other textual formats.

use crate::content::ContentBuffer;
use crate::error::Result;
use crate::media::MediaType;
use crate::metadata::{self, Metadata};

pub(super) fn parse(
    data: &[u8],
    media_type: MediaType,
    metadata: &mut Metadata,
    content: &mut ContentBuffer,
) -> Result<()> {
    let (text, charset) = super::decode(data);
    metadata.set(metadata::CONTENT_TYPE, media_type.with_parameter("charset", charset).to_string());
    if charset.starts_with("UTF-16") {
        metadata.set(metadata::CONTENT_ENCODING, charset);
    }
    content.push_str(&text);
    Ok(())
}
