use std::path::PathBuf;

use clap::{ArgAction, Parser};
use delve_config::{Config, OutputFormat};
use delve_inventory::Sort;

/// Recursively inventory a directory: MIME type, metadata, language and
/// archive contents of every file.
#[derive(Debug, Parser)]
#[command(name = "delve", version, about)]
pub struct Cli {
    /// Directory to scan.
    #[arg(value_name = "DIR")]
    pub root: PathBuf,

    /// Configuration file (toml, yaml or json, by extension).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format: table or jsonl.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Sort the table by name, path, mime, main, sub, params or meta; append
    /// `:desc` to reverse.
    #[arg(long, value_name = "COLUMN[:desc]")]
    pub sort: Option<Sort>,

    /// Follow symbolic links to directories.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Don't descend more than this many levels below DIR.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Visit directory entries in name order.
    #[arg(long)]
    pub sorted: bool,

    /// Don't list the contents of archives.
    #[arg(long)]
    pub no_archives: bool,

    /// Use file names to refine textual types.
    #[arg(long)]
    pub name_hints: bool,

    /// Show a progress bar on stderr.
    #[arg(long)]
    pub progress: bool,

    /// More log output; repeat for more. `RUST_LOG` takes precedence.
    #[arg(short, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less log output; repeat for less.
    #[arg(short, action = ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    /// Lays the flags over loaded configuration. Flags only ever switch
    /// behaviour on; an absent flag keeps the configured value.
    pub fn apply(&self, config: &mut Config) {
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if self.max_depth.is_some() {
            config.scan.max_depth = self.max_depth;
        }
        config.scan.follow_symlinks |= self.follow_symlinks;
        config.scan.sort_entries |= self.sorted;
        config.inspect.list_archives &= !self.no_archives;
        config.inspect.name_hints |= self.name_hints;
        config.output.progress |= self.progress;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use delve_inventory::{Column, SortOrder};

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "delve",
            "/srv",
            "-f",
            "jsonl",
            "--max-depth",
            "4",
            "--follow-symlinks",
            "--sorted",
            "--no-archives",
            "--name-hints",
            "--progress",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.output.format, OutputFormat::Jsonl);
        assert_eq!(config.scan.max_depth, Some(4));
        assert!(config.scan.follow_symlinks);
        assert!(config.scan.sort_entries);
        assert!(!config.inspect.list_archives);
        assert!(config.inspect.name_hints);
        assert!(config.output.progress);
    }

    #[test]
    fn absent_flags_keep_config() {
        let cli = Cli::try_parse_from(["delve", "/srv"]).unwrap();
        let mut config = Config::default();
        config.scan.sort_entries = true;
        config.scan.max_depth = Some(2);
        cli.apply(&mut config);
        assert!(config.scan.sort_entries);
        assert_eq!(config.scan.max_depth, Some(2));
        assert!(config.inspect.list_archives);
    }

    #[test]
    fn sort_and_verbosity() {
        let cli = Cli::try_parse_from(["delve", "--sort", "mime:desc", "-vv", "/srv"]).unwrap();
        let sort = cli.sort.unwrap();
        assert_eq!(sort.column, Column::MimeType);
        assert_eq!(sort.order, SortOrder::Descending);
        assert_eq!(cli.verbose, 2);
        assert!(Cli::try_parse_from(["delve", "-v", "-q", "/srv"]).is_err());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Cli::try_parse_from(["delve", "-f", "xml", "/srv"]).is_err());
        assert!(Cli::try_parse_from(["delve", "--sort", "size", "/srv"]).is_err());
        assert!(Cli::try_parse_from(["delve"]).is_err());
    }
}
