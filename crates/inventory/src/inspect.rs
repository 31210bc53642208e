//! Per-file inspection: content parsing, type detection, language guessing
//! and archive listing.

use std::fs::File;
use std::path::Path;

use delve_archive::{Archive, ArchiveFamily, is_archive_subtype};
use delve_compress::PeekableReader;
use delve_config::InspectConfig;
use delve_detect::metadata::RESOURCE_NAME;
use delve_detect::{
    AutoDetectParser, ContentBuffer, Detector, HEAD_LEN, LanguageGuess, LanguageIdentifier, MagicDetector, MediaType,
    Metadata, Parser, StopwordIdentifier,
};
use exn::ResultExt;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::record::{Draft, InspectionResult};

/// Everything learned while inspecting one file.
///
/// Only [`result`](Self::result) goes to the result sink; the rest is
/// diagnostic.
#[derive(Debug)]
pub struct Inspection {
    pub result: InspectionResult,
    /// Best guess at the language of the extracted text.
    pub language: Option<LanguageGuess>,
    /// Leaf names of the file's archive entries, when it was listed.
    pub entries: Vec<String>,
    /// Why the inspection stopped early, if it did. The result then holds
    /// whatever had been filled in by that point.
    pub failure: Option<Error>,
}

impl Inspection {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Runs the collaborator services over one file at a time.
pub struct Inspector {
    parser: Box<dyn Parser + Send + Sync>,
    detector: Box<dyn Detector + Send + Sync>,
    identifier: Box<dyn LanguageIdentifier + Send + Sync>,
    max_content_chars: usize,
    list_archives: bool,
    name_hints: bool,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(&InspectConfig::default())
    }
}

impl Inspector {
    /// An inspector using the default parser, detector and identifier.
    pub fn new(config: &InspectConfig) -> Self {
        Self {
            parser: Box::new(AutoDetectParser::new(config.max_read_bytes)),
            detector: Box::new(MagicDetector::new()),
            identifier: Box::new(StopwordIdentifier::new()),
            max_content_chars: config.max_content_chars,
            list_archives: config.list_archives,
            name_hints: config.name_hints,
        }
    }

    pub fn with_parser(mut self, parser: impl Parser + Send + Sync + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn with_detector(mut self, detector: impl Detector + Send + Sync + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn with_identifier(mut self, identifier: impl LanguageIdentifier + Send + Sync + 'static) -> Self {
        self.identifier = Box::new(identifier);
        self
    }

    /// Inspects the file at `path`. Never fails: a problem is logged, kept on
    /// [`Inspection::failure`], and the partial result is still returned.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn inspect(&self, path: &Path) -> Inspection {
        info!("Investigating");
        let mut draft = Draft::new(path);
        let mut language = None;
        let mut entries = Vec::new();
        let failure = self.run(path, &mut draft, &mut language, &mut entries).err();
        if let Some(err) = &failure {
            warn!(error = ?err, "Inspection failed; keeping partial result");
        }
        Inspection { result: draft.freeze(), language, entries, failure }
    }

    fn run(
        &self,
        path: &Path,
        draft: &mut Draft,
        language: &mut Option<LanguageGuess>,
        entries: &mut Vec<String>,
    ) -> Result<()> {
        let mut metadata = Metadata::new();
        let mut content = ContentBuffer::with_limit(self.max_content_chars);
        let mut file = File::open(path).or_raise(|| ErrorKind::Open)?;
        self.parser.parse(&mut file, &mut metadata, &mut content).or_raise(|| ErrorKind::Parse)?;
        drop(file);

        // The parser consumed the first stream.
        let mut stream = PeekableReader::new(File::open(path).or_raise(|| ErrorKind::Open)?);
        let head = stream.peek(HEAD_LEN).or_raise(|| ErrorKind::Read)?;
        let media_type = if self.name_hints {
            let mut hint = metadata.clone();
            hint.set(RESOURCE_NAME, draft.file_name());
            self.detector.detect(head, &hint)
        } else {
            self.detector.detect(head, &metadata)
        };

        *language = self.identifier.identify(content.as_str());
        match language {
            Some(guess) => info!(language = %guess.code, name = guess.name(), score = guess.score, "Detected language"),
            None => debug!("No language detected"),
        }
        info!(media_type = %media_type, "Detected type");

        drop(stream);
        if self.list_archives && is_archive_subtype(media_type.sub_type()) {
            *entries = list_archive(path, &media_type);
        }

        for (name, value) in media_type.parameters() {
            debug!(name, value, "Type parameter");
        }
        for (name, value) in metadata.iter() {
            debug!(name, value, "Metadata");
        }
        draft.set_media_type(&media_type);
        draft.set_has_metadata(!metadata.is_empty());
        Ok(())
    }
}

/// Lists an archive from a fresh handle, so zips can use their central
/// directory. Failures end the listing, keeping the names already read.
fn list_archive(path: &Path, media_type: &MediaType) -> Vec<String> {
    let family = ArchiveFamily::from_subtype(media_type.sub_type());
    let opened = File::open(path)
        .or_raise(|| delve_archive::error::ErrorKind::Io)
        .and_then(|file| Archive::open_seekable(file, family));
    let mut archive = match opened {
        Ok(archive) => archive,
        Err(err) => {
            warn!(error = ?err, "Unable to open archive");
            return Vec::new();
        },
    };
    debug!(format = %archive.format(), compression = %archive.compression(), "Listing archive");
    archive
        .names()
        .inspect(|name| info!(entry = name.as_str(), "Archive entry"))
        .collect()
}
