//! Magic byte signatures, in priority order.

use crate::media::MediaType;

struct Signature {
    /// Every `(offset, bytes)` pair must match.
    patterns: &'static [(usize, &'static [u8])],
    media_type: (&'static str, &'static str),
    /// May replace the matched type with a more specific one.
    refine: Option<fn(&[u8]) -> Option<MediaType>>,
}

const fn sig(patterns: &'static [(usize, &'static [u8])], main: &'static str, sub: &'static str) -> Signature {
    Signature { patterns, media_type: (main, sub), refine: None }
}

impl Signature {
    const fn refined(mut self, refine: fn(&[u8]) -> Option<MediaType>) -> Self {
        self.refine = Some(refine);
        self
    }

    fn matches(&self, head: &[u8]) -> bool {
        self.patterns
            .iter()
            .all(|&(offset, bytes)| head.get(offset..offset + bytes.len()) == Some(bytes))
    }
}

const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";

static SIGNATURES: &[Signature] = &[
    sig(&[(0, b"%PDF-")], "application", "pdf"),
    sig(&[(0, b"\x89PNG\r\n\x1a\n")], "image", "png"),
    sig(&[(0, b"GIF87a")], "image", "gif"),
    sig(&[(0, b"GIF89a")], "image", "gif"),
    sig(&[(0, b"\xFF\xD8\xFF")], "image", "jpeg"),
    sig(&[(0, b"II*\x00")], "image", "tiff"),
    sig(&[(0, b"MM\x00*")], "image", "tiff"),
    // The four reserved header bytes keep "BM" prefixed text out.
    sig(&[(0, b"BM"), (6, b"\x00\x00\x00\x00")], "image", "bmp"),
    sig(&[(0, ZIP_LOCAL_HEADER)], "application", "zip").refined(zip_document),
    sig(&[(0, b"PK\x05\x06")], "application", "zip"),
    sig(&[(0, b"\x1F\x8B")], "application", "gzip"),
    sig(&[(0, b"BZh")], "application", "x-bzip2"),
    sig(&[(0, b"\xFD7zXZ\x00")], "application", "x-xz"),
    sig(&[(0, b"\x28\xB5\x2F\xFD")], "application", "zstd"),
    sig(&[(0, b"7z\xBC\xAF\x27\x1C")], "application", "x-7z-compressed"),
    sig(&[(0, b"Rar!\x1A\x07")], "application", "x-rar-compressed"),
    sig(&[(0, b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1")], "application", "x-tika-msoffice"),
    sig(&[(0, b"{\\rtf")], "application", "rtf"),
    sig(&[(0, b"\x7FELF")], "application", "x-executable"),
    sig(&[(0, b"MZ")], "application", "x-msdownload"),
    sig(&[(0, b"SQLite format 3\x00")], "application", "x-sqlite3"),
    sig(&[(0, b"OggS")], "application", "ogg"),
    sig(&[(0, b"fLaC")], "audio", "x-flac"),
    sig(&[(0, b"ID3")], "audio", "mpeg"),
    sig(&[(0, b"RIFF"), (8, b"WAVE")], "audio", "x-wav"),
    sig(&[(0, b"RIFF"), (8, b"AVI ")], "video", "x-msvideo"),
    sig(&[(0, b"RIFF"), (8, b"WEBP")], "image", "webp"),
    sig(&[(0, b"!<arch>\ndebian-binary")], "application", "x-debian-package"),
    sig(&[(0, b"!<arch>\n")], "application", "x-archive"),
    sig(&[(0, b"070701")], "application", "x-cpio"),
    sig(&[(0, b"070702")], "application", "x-cpio"),
    sig(&[(0, b"070707")], "application", "x-cpio"),
    sig(&[(0, b"\xC7\x71")], "application", "x-cpio"),
    sig(&[(0, b"\x71\xC7")], "application", "x-cpio"),
    sig(&[(257, b"ustar  \x00")], "application", "x-gtar"),
    sig(&[(257, b"ustar\x00")], "application", "x-tar"),
];

pub(super) fn match_signature(head: &[u8]) -> Option<MediaType> {
    let signature = SIGNATURES.iter().find(|signature| signature.matches(head))?;
    let (main, sub) = signature.media_type;
    Some(signature.refine.and_then(|refine| refine(head)).unwrap_or_else(|| MediaType::new(main, sub)))
}

fn le_u16(head: &[u8], offset: usize) -> Option<usize> {
    Some(u16::from_le_bytes(head.get(offset..offset + 2)?.try_into().ok()?) as usize)
}

fn le_u32(head: &[u8], offset: usize) -> Option<usize> {
    Some(u32::from_le_bytes(head.get(offset..offset + 4)?.try_into().ok()?) as usize)
}

/// Zip based document formats, recognised by their first entry.
///
/// ODF and EPUB store their media type uncompressed in a leading `mimetype`
/// entry; OOXML leads with `[Content_Types].xml` and JAR with `META-INF/`.
fn zip_document(head: &[u8]) -> Option<MediaType> {
    let name_len = le_u16(head, 26)?;
    let extra_len = le_u16(head, 28)?;
    let name = head.get(30..30 + name_len)?;
    if name == b"[Content_Types].xml" {
        return Some(MediaType::new("application", "x-tika-ooxml"));
    }
    if name.starts_with(b"META-INF/") {
        return Some(MediaType::new("application", "java-archive"));
    }
    if name != b"mimetype" || le_u16(head, 8)? != 0 {
        return None;
    }
    let start = 30 + name_len + extra_len;
    let value = head.get(start..start + le_u32(head, 18)?)?;
    std::str::from_utf8(value).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn zip_head(name: &[u8], content: &[u8]) -> Vec<u8> {
        let mut head = Vec::new();
        head.extend_from_slice(ZIP_LOCAL_HEADER);
        head.extend_from_slice(&[20, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        head.extend_from_slice(&(content.len() as u32).to_le_bytes());
        head.extend_from_slice(&(content.len() as u32).to_le_bytes());
        head.extend_from_slice(&(name.len() as u16).to_le_bytes());
        head.extend_from_slice(&0u16.to_le_bytes());
        head.extend_from_slice(name);
        head.extend_from_slice(content);
        head
    }

    fn tar_head(magic: &[u8]) -> Vec<u8> {
        let mut head = vec![0u8; 512];
        head[..9].copy_from_slice(b"hello.txt");
        head[257..257 + magic.len()].copy_from_slice(magic);
        head
    }

    #[rstest]
    #[case(b"%PDF-1.4\n".to_vec(), "application/pdf")]
    #[case(b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR".to_vec(), "image/png")]
    #[case(b"GIF89a\x01\x00\x01\x00".to_vec(), "image/gif")]
    #[case(b"\xFF\xD8\xFF\xE0".to_vec(), "image/jpeg")]
    #[case(b"BM\x46\x00\x00\x00\x00\x00\x00\x00".to_vec(), "image/bmp")]
    #[case(b"\x1F\x8B\x08\x00".to_vec(), "application/gzip")]
    #[case(b"BZh91AY&SY".to_vec(), "application/x-bzip2")]
    #[case(b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec(), "audio/x-wav")]
    #[case(b"RIFF\x24\x00\x00\x00AVI LIST".to_vec(), "video/x-msvideo")]
    #[case(b"!<arch>\ndebian-binary   ".to_vec(), "application/x-debian-package")]
    #[case(b"!<arch>\nhello.o/        ".to_vec(), "application/x-archive")]
    #[case(b"070701000000".to_vec(), "application/x-cpio")]
    #[case(tar_head(b"ustar\x0000"), "application/x-tar")]
    #[case(tar_head(b"ustar  \x00"), "application/x-gtar")]
    #[case(zip_head(b"hello.txt", b"hi"), "application/zip")]
    #[case(zip_head(b"mimetype", b"application/epub+zip"), "application/epub+zip")]
    #[case(
        zip_head(b"mimetype", b"application/vnd.oasis.opendocument.text"),
        "application/vnd.oasis.opendocument.text"
    )]
    #[case(zip_head(b"[Content_Types].xml", b"<Types/>"), "application/x-tika-ooxml")]
    #[case(zip_head(b"META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"), "application/java-archive")]
    #[case(b"PK\x05\x06\x00\x00".to_vec(), "application/zip")]
    fn signatures(#[case] head: Vec<u8>, #[case] expected: &str) {
        assert_eq!(match_signature(&head).map(|t| t.to_string()).as_deref(), Some(expected));
    }

    #[rstest]
    #[case(b"BMW is a car brand")]
    #[case(b"RIFF\x24\x00\x00\x00ABCD")]
    #[case(b"plain text")]
    #[case(b"")]
    fn no_signature(#[case] head: &[u8]) {
        assert_eq!(match_signature(head), None);
    }

    #[test]
    fn truncated_mimetype_entry_falls_back_to_zip() {
        let mut head = zip_head(b"mimetype", b"application/epub+zip");
        head.truncate(45);
        assert_eq!(match_signature(&head), Some(MediaType::new("application", "zip")));
    }
}
