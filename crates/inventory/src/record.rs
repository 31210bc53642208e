//! The per-file result record and the table columns that render it.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

use delve_detect::MediaType;
use serde::Serialize;

/// Value of every detected field until detection fills it in.
pub const UNKNOWN: &str = "unknown";

/// What was learned about one file. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InspectionResult {
    file_name: String,
    file_path: String,
    mime_type: String,
    mime_main_type: String,
    mime_sub_type: String,
    has_parameters: bool,
    has_metadata: bool,
}

impl InspectionResult {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Full `main/sub; key=value` form.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn mime_main_type(&self) -> &str {
        &self.mime_main_type
    }

    pub fn mime_sub_type(&self) -> &str {
        &self.mime_sub_type
    }

    pub fn has_parameters(&self) -> bool {
        self.has_parameters
    }

    pub fn has_metadata(&self) -> bool {
        self.has_metadata
    }

    /// `true` while no type has been detected.
    pub fn is_unknown(&self) -> bool {
        self.mime_type == UNKNOWN
    }
}

/// Mutable stand-in for an [`InspectionResult`] while a file is inspected.
#[derive(Debug)]
pub(crate) struct Draft(InspectionResult);

impl Draft {
    pub(crate) fn new(path: &Path) -> Self {
        let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
        Self(InspectionResult {
            file_name,
            file_path: path.display().to_string(),
            mime_type: UNKNOWN.to_string(),
            mime_main_type: UNKNOWN.to_string(),
            mime_sub_type: UNKNOWN.to_string(),
            has_parameters: false,
            has_metadata: false,
        })
    }

    pub(crate) fn file_name(&self) -> &str {
        &self.0.file_name
    }

    pub(crate) fn set_media_type(&mut self, media_type: &MediaType) {
        self.0.mime_type = media_type.to_string();
        self.0.mime_main_type = media_type.main_type().to_string();
        self.0.mime_sub_type = media_type.sub_type().to_string();
        self.0.has_parameters = media_type.has_parameters();
    }

    pub(crate) fn set_has_metadata(&mut self, has_metadata: bool) {
        self.0.has_metadata = has_metadata;
    }

    pub(crate) fn freeze(self) -> InspectionResult {
        self.0
    }
}

/// A column of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    FileName,
    FilePath,
    MimeType,
    MainType,
    SubType,
    Parameters,
    Metadata,
}

impl Column {
    /// Every column, in display order.
    pub const ALL: [Self; 7] = [
        Self::FileName,
        Self::FilePath,
        Self::MimeType,
        Self::MainType,
        Self::SubType,
        Self::Parameters,
        Self::Metadata,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::FileName => "File Name",
            Self::FilePath => "File Path",
            Self::MimeType => "MIME Type",
            Self::MainType => "MIME Main Type",
            Self::SubType => "MIME Sub-type",
            Self::Parameters => "Parameters Present?",
            Self::Metadata => "Meta-data Present?",
        }
    }

    /// Short name accepted by [`FromStr`].
    pub fn key(&self) -> &'static str {
        match self {
            Self::FileName => "name",
            Self::FilePath => "path",
            Self::MimeType => "mime",
            Self::MainType => "main",
            Self::SubType => "sub",
            Self::Parameters => "params",
            Self::Metadata => "meta",
        }
    }

    pub fn cell<'a>(&self, result: &'a InspectionResult) -> &'a str {
        let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
        match self {
            Self::FileName => result.file_name(),
            Self::FilePath => result.file_path(),
            Self::MimeType => result.mime_type(),
            Self::MainType => result.mime_main_type(),
            Self::SubType => result.mime_sub_type(),
            Self::Parameters => yes_no(result.has_parameters()),
            Self::Metadata => yes_no(result.has_metadata()),
        }
    }

    /// Orders two results by this column. Booleans sort `false` first.
    pub fn compare(&self, a: &InspectionResult, b: &InspectionResult) -> Ordering {
        match self {
            Self::Parameters => a.has_parameters().cmp(&b.has_parameters()),
            Self::Metadata => a.has_metadata().cmp(&b.has_metadata()),
            _ => self.cell(a).cmp(self.cell(b)),
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|column| column.key() == wanted)
            .ok_or_else(|| format!("unknown column {s:?}, expected one of: name, path, mime, main, sub, params, meta"))
    }
}
