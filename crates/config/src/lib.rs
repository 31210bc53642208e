//! Layered configuration for delve.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `config.{toml,yaml,yml,json}` in the platform configuration directory
//! 3. an explicit file passed by the caller
//! 4. `DELVE_` environment variables, with `__` separating sections
//!    (`DELVE_SCAN__FOLLOW_SYMLINKS=true`)
//!
//! Command-line flags are applied on top by the binary.

pub mod error;

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use tracing::{Level, debug};

use crate::error::{ErrorKind, Result};

/// File names looked up in the platform configuration directory.
pub const CONFIG_FILES: [&str; 4] = ["config.toml", "config.yaml", "config.yml", "config.json"];
pub const ENV_PREFIX: &str = "DELVE_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub inspect: InspectConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
}

/// How the directory tree is walked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Follow symbolic links to directories.
    pub follow_symlinks: bool,
    /// Deepest level to descend to; the root's children are at depth 1.
    pub max_depth: Option<usize>,
    /// Visit siblings in file name order instead of listing order.
    pub sort_entries: bool,
}

/// What is done with each file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Upper bound on bytes handed to the content parser.
    pub max_read_bytes: u64,
    /// Upper bound on extracted characters kept for language identification.
    pub max_content_chars: usize,
    /// List the entries of recognised archives.
    pub list_archives: bool,
    /// Let the detector use the file name to refine textual types.
    pub name_hints: bool,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self { max_read_bytes: 16 * 1024 * 1024, max_content_chars: 100_000, list_archives: true, name_hints: false }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned table, sorted and printed once the scan is done.
    #[default]
    Table,
    /// One JSON object per line, streamed as files are inspected.
    Jsonl,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Jsonl => "jsonl",
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ErrorKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "jsonl" | "json-lines" | "ndjson" => Ok(Self::Jsonl),
            other => Err(ErrorKind::Value { key: "output.format", reason: format!("unknown format {other:?}") }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl LogConfig {
    pub fn level(&self) -> Result<Level> {
        Level::from_str(&self.level).or_raise(|| ErrorKind::Value { key: "log.level", reason: self.level.clone() })
    }
}

/// The platform configuration directory, when the platform has one.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "delve").map(|dirs| dirs.config_dir().to_path_buf())
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    debug!(path = %path.display(), "Merging configuration file");
    let figment = match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.display().to_string())),
    };
    Ok(figment)
}

impl Config {
    /// Loads configuration from every source, using the platform
    /// configuration directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from(config_dir().as_deref(), explicit)
    }

    /// As [`Config::load`], reading default files from `dir` instead.
    pub fn load_from(dir: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(dir, explicit)?.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        Ok(config)
    }

    /// The provider stack behind [`Config::load_from`].
    pub fn figment(dir: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(dir) = dir {
            for name in CONFIG_FILES {
                let path = dir.join(name);
                if path.is_file() {
                    figment = merge_file(figment, &path)?;
                }
            }
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.display().to_string()));
            }
            figment = merge_file(figment, path)?;
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Rejects values that deserialize but can't be used.
    pub fn validate(&self) -> Result<()> {
        if self.inspect.max_read_bytes == 0 {
            exn::bail!(ErrorKind::Value { key: "inspect.max_read_bytes", reason: "must be positive".to_string() });
        }
        if self.inspect.max_content_chars == 0 {
            exn::bail!(ErrorKind::Value { key: "inspect.max_content_chars", reason: "must be positive".to_string() });
        }
        self.log.level()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn defaults() {
        Jail::expect_with(|jail| {
            let config = Config::load_from(Some(jail.directory()), None).unwrap();
            assert_eq!(config, Config::default());
            assert!(!config.scan.follow_symlinks);
            assert_eq!(config.scan.max_depth, None);
            assert_eq!(config.inspect.max_read_bytes, 16_777_216);
            assert_eq!(config.inspect.max_content_chars, 100_000);
            assert!(config.inspect.list_archives);
            assert_eq!(config.output.format, OutputFormat::Table);
            assert_eq!(config.log.level().unwrap(), Level::INFO);
            Ok(())
        });
    }

    #[rstest]
    #[case("custom.toml", "[scan]\nmax_depth = 3\n[output]\nformat = \"jsonl\"\n")]
    #[case("custom.yaml", "scan:\n  max_depth: 3\noutput:\n  format: jsonl\n")]
    #[case("custom.json", r#"{"scan": {"max_depth": 3}, "output": {"format": "jsonl"}}"#)]
    fn explicit_file(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(name, contents)?;
            let config = Config::load_from(None, Some(Path::new(name))).unwrap();
            assert_eq!(config.scan.max_depth, Some(3));
            assert_eq!(config.output.format, OutputFormat::Jsonl);
            assert!(config.inspect.list_archives);
            Ok(())
        });
    }

    #[test]
    fn precedence() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[scan]\nsort_entries = true\nmax_depth = 1\n[log]\nlevel = \"warn\"\n")?;
            jail.create_file("explicit.toml", "[scan]\nmax_depth = 2\n")?;
            jail.set_env("DELVE_SCAN__FOLLOW_SYMLINKS", "true");
            jail.set_env("DELVE_LOG__LEVEL", "debug");
            let config = Config::load_from(Some(jail.directory()), Some(Path::new("explicit.toml"))).unwrap();
            assert!(config.scan.sort_entries);
            assert_eq!(config.scan.max_depth, Some(2));
            assert!(config.scan.follow_symlinks);
            assert_eq!(config.log.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file() {
        Jail::expect_with(|_| {
            let err = Config::load_from(None, Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::NotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn unsupported_extension() {
        Jail::expect_with(|jail| {
            jail.create_file("config.ini", "level = debug")?;
            let err = Config::load_from(None, Some(Path::new("config.ini"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }

    #[rstest]
    #[case("DELVE_INSPECT__MAX_READ_BYTES", "0", Some("inspect.max_read_bytes"))]
    #[case("DELVE_LOG__LEVEL", "chatty", Some("log.level"))]
    #[case("DELVE_OUTPUT__FORMAT", "xml", None)]
    fn invalid_values(#[case] var: &str, #[case] value: &str, #[case] key: Option<&str>) {
        Jail::expect_with(|jail| {
            jail.set_env(var, value);
            let err = Config::load_from(None, None).unwrap_err();
            match key {
                Some(expected) => assert!(matches!(&*err, ErrorKind::Value { key, .. } if *key == expected)),
                None => assert_eq!(*err, ErrorKind::Invalid),
            }
            Ok(())
        });
    }

    #[test]
    fn config_dir_is_scanned_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[output]\nprogress = true\n").unwrap();
        std::fs::write(dir.path().join("config.json"), r#"{"output": {"progress": false}}"#).unwrap();
        let config = Config::load_from(Some(dir.path()), None).unwrap();
        assert!(!config.output.progress);
    }

    #[rstest]
    #[case("table", OutputFormat::Table)]
    #[case("JSONL", OutputFormat::Jsonl)]
    #[case("ndjson", OutputFormat::Jsonl)]
    fn output_format_from_str(#[case] input: &str, #[case] expected: OutputFormat) {
        assert_eq!(input.parse::<OutputFormat>().unwrap(), expected);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
