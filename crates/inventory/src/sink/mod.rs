//! Consumers of inspection results.

mod jsonl;
mod table;

pub use self::jsonl::JsonLines;
pub use self::table::{Sort, SortOrder, Table};

use crate::error::Result;
use crate::record::InspectionResult;

/// Receives every result of a scan, in visit order.
pub trait ResultSink {
    fn push(&mut self, result: InspectionResult);

    /// Flushes anything buffered and reports a failure deferred from
    /// [`push`](Self::push).
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Records results for inspection by tests and embedding callers.
impl ResultSink for Vec<InspectionResult> {
    fn push(&mut self, result: InspectionResult) {
        Vec::push(self, result);
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn push(&mut self, result: InspectionResult) {
        (**self).push(result);
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}
