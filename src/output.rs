//! Everything written for the user: the progress bar, results and the
//! closing summary.

use std::io::{self, BufWriter, Write};

use delve_config::OutputFormat;
use delve_inventory::{Investigation, JsonLines, ScanEvent, ScanSummary, Sort, Table};
use exn::ResultExt;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{ErrorKind, Result};

const PROGRESS_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files ({eta})";

/// A progress bar on stderr, or nothing when disabled.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self { bar: ProgressBar::hidden() };
        }
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self { bar }
    }

    pub fn observe(&self, event: &ScanEvent) {
        match event {
            ScanEvent::DiscoveryComplete(total) => self.bar.set_length(*total),
            ScanEvent::Progress(progress) => {
                // The estimate may be stale; never show more done than there is.
                if progress.processed() > progress.total() {
                    self.bar.set_length(progress.processed());
                }
                self.bar.set_position(progress.processed());
            },
            ScanEvent::Complete(_) => self.bar.finish_and_clear(),
            _ => {},
        }
    }
}

/// Consumes the investigation, writing results to `out` in `format`.
pub fn write_results(
    investigation: Investigation,
    format: OutputFormat,
    sort: Option<Sort>,
    progress: &Progress,
    out: impl Write,
) -> Result<ScanSummary> {
    let observe = |event: &ScanEvent| progress.observe(event);
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            let summary = investigation.drain_into(&mut table, observe).or_raise(|| ErrorKind::Output)?;
            if let Some(sort) = sort {
                table.sort(sort);
            }
            let mut out = BufWriter::new(out);
            write!(out, "{table}").or_raise(|| ErrorKind::Output)?;
            out.flush().or_raise(|| ErrorKind::Output)?;
            Ok(summary)
        },
        OutputFormat::Jsonl => {
            let mut sink = JsonLines::new(BufWriter::new(out));
            investigation.drain_into(&mut sink, observe).or_raise(|| ErrorKind::Output)
        },
    }
}

pub fn summary_line(summary: &ScanSummary) -> String {
    let mut line = format!(
        "{} of ~{} files processed, {} failed, {} unreadable directories",
        summary.processed, summary.total, summary.failed, summary.unreadable
    );
    if summary.cancelled {
        line.push_str(" (stopped early)");
    }
    line
}

pub fn print_summary(summary: &ScanSummary) -> io::Result<()> {
    writeln!(io::stderr().lock(), "{}", summary_line(summary))
}
