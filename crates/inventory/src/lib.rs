//! Recursive directory inventory.
//!
//! A [`TreeScanner`] walks the tree, an [`Inspector`] looks at each file
//! and the resulting [`InspectionResult`]s go to a [`ResultSink`]. An
//! [`Investigation`] runs the whole thing on a worker thread and reports
//! through a channel of [`ScanEvent`]s:
//!
//! ```rust,no_run
//! use delve_inventory::{Inspector, Investigation, Table, TreeScanner};
//!
//! let investigation = Investigation::start("/srv/share", TreeScanner::default(), Inspector::default())?;
//! let mut table = Table::new();
//! let summary = investigation.drain_into(&mut table, |_| {})?;
//! println!("{table}");
//! println!("{} files, {} failed", summary.processed, summary.failed);
//! # Ok::<(), delve_inventory::error::Error>(())
//! ```

pub mod error;
mod inspect;
mod investigation;
mod progress;
mod record;
mod sink;
mod walk;

pub use crate::inspect::{Inspection, Inspector};
pub use crate::investigation::{CancelHandle, EVENT_CAPACITY, Investigation, ScanEvent, ScanSummary, scan};
pub use crate::progress::ScanProgress;
pub use crate::record::{Column, InspectionResult, UNKNOWN};
pub use crate::sink::{JsonLines, ResultSink, Sort, SortOrder, Table};
pub use crate::walk::{TreeScanner, Visit};
