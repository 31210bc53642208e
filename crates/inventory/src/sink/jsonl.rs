use std::io::Write;

use exn::ResultExt;
use tracing::warn;

use crate::error::{Error, ErrorKind, Result};
use crate::record::InspectionResult;
use crate::sink::ResultSink;

/// Streams each result as one JSON object per line.
///
/// The first write failure is kept and reported by
/// [`finish`](ResultSink::finish); later results are dropped.
#[derive(Debug)]
pub struct JsonLines<W: Write> {
    writer: W,
    written: u64,
    error: Option<Error>,
}

impl<W: Write> JsonLines<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0, error: None }
    }

    /// Records written successfully so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, result: &InspectionResult) -> Result<()> {
        serde_json::to_writer(&mut self.writer, result).or_raise(|| ErrorKind::Output)?;
        self.writer.write_all(b"\n").or_raise(|| ErrorKind::Output)?;
        Ok(())
    }
}

impl<W: Write> ResultSink for JsonLines<W> {
    fn push(&mut self, result: InspectionResult) {
        if self.error.is_some() {
            return;
        }
        match self.write(&result) {
            Ok(()) => self.written += 1,
            Err(err) => {
                warn!(error = ?err, path = result.file_path(), "Unable to write result");
                self.error = Some(err);
            },
        }
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush().or_raise(|| ErrorKind::Output)
    }
}
