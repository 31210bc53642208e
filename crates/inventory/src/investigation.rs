//! A whole scan run on a background thread, reported as [`ScanEvent`]s.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};
use exn::ResultExt;
use tracing::{debug, info, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::inspect::{Inspection, Inspector};
use crate::progress::ScanProgress;
use crate::sink::ResultSink;
use crate::walk::{TreeScanner, Visit};

/// Events sent while there's an inspection running between worker
/// thread and presentation layer.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete), exactly once, with the
///    estimated file count.
/// 3. Per file, [`Inspected`](Self::Inspected) then
///    [`Progress`](Self::Progress). [`Unreadable`](Self::Unreadable) may be
///    interleaved.
/// 4. [`Complete`](Self::Complete), exactly once.
#[derive(Debug)]
pub enum ScanEvent {
    Started,
    DiscoveryComplete(u64),
    Inspected(Box<Inspection>),
    Progress(ScanProgress),
    /// A directory branch was skipped.
    Unreadable(Error),
    Complete(ScanSummary),
}

/// Totals for a finished (or cancelled) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScanSummary {
    /// The counting pass estimate.
    pub total: u64,
    pub processed: u64,
    /// Files whose inspection stopped early.
    pub failed: u64,
    pub unreadable: u64,
    pub cancelled: bool,
}

/// Shared flag asking a running scan to stop after the current file.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs a complete scan on the calling thread.
///
/// `emit` receives every event; returning `false` stops the scan after the
/// current file, as does `cancel`. The counting pass always completes.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn scan(
    root: &Path,
    scanner: &TreeScanner,
    inspector: &Inspector,
    cancel: &CancelHandle,
    mut emit: impl FnMut(ScanEvent) -> bool,
) -> ScanSummary {
    let mut summary = ScanSummary::default();
    let mut stopped = !emit(ScanEvent::Started);
    if !stopped {
        summary.total = scanner.count_files(root);
        info!(total = summary.total, "Discovery complete");
        stopped = !emit(ScanEvent::DiscoveryComplete(summary.total));
    }

    let mut progress = ScanProgress::new(summary.total);
    if !stopped {
        let flow = scanner.visit(root, |visit| {
            if cancel.is_cancelled() {
                return ControlFlow::Break(());
            }
            match visit {
                Visit::File(path) => {
                    let inspection = inspector.inspect(path);
                    summary.failed += u64::from(inspection.is_failure());
                    let sent = emit(ScanEvent::Inspected(Box::new(inspection)));
                    // Always counted, even when the file failed.
                    summary.processed = progress.advance().processed();
                    if !sent || !emit(ScanEvent::Progress(progress)) {
                        return ControlFlow::Break(());
                    }
                },
                Visit::Unreadable(err) => {
                    summary.unreadable += 1;
                    if !emit(ScanEvent::Unreadable(err)) {
                        return ControlFlow::Break(());
                    }
                },
            }
            ControlFlow::Continue(())
        });
        stopped = flow.is_break();
    }
    summary.cancelled = stopped;
    info!(
        processed = summary.processed,
        failed = summary.failed,
        unreadable = summary.unreadable,
        cancelled = summary.cancelled,
        "Scan finished"
    );
    emit(ScanEvent::Complete(summary));
    summary
}

/// Number of events buffered between the worker and the consumer.
pub const EVENT_CAPACITY: usize = 64;

/// A scan running on its own thread.
pub struct Investigation {
    events: Receiver<ScanEvent>,
    cancel: CancelHandle,
    worker: JoinHandle<ScanSummary>,
}

impl Investigation {
    /// Starts scanning `root`, which must be a readable directory.
    pub fn start(root: impl Into<PathBuf>, scanner: TreeScanner, inspector: Inspector) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            exn::bail!(ErrorKind::Root(root.display().to_string()));
        }
        let (sender, events) = bounded(EVENT_CAPACITY);
        let cancel = CancelHandle::new();
        let worker_cancel = cancel.clone();
        let worker = thread::Builder::new()
            .name("delve-scan".to_string())
            .spawn(move || run_worker(&root, &scanner, &inspector, &worker_cancel, &sender))
            .or_raise(|| ErrorKind::Worker)?;
        Ok(Self { events, cancel, worker })
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Stops reading events and waits for the worker. Unread events are
    /// dropped, which also makes the worker stop after its current file.
    pub fn join(self) -> Result<ScanSummary> {
        drop(self.events);
        self.worker.join().map_err(|_| exn::Exn::from(ErrorKind::Worker))
    }

    /// Forwards every result to `sink` in visit order, showing each event to
    /// `observe` first, then finishes the sink.
    pub fn drain_into(self, sink: &mut dyn ResultSink, mut observe: impl FnMut(&ScanEvent)) -> Result<ScanSummary> {
        for event in self.events.iter() {
            observe(&event);
            if let ScanEvent::Inspected(inspection) = event {
                sink.push(inspection.result);
            }
        }
        let summary = self.join()?;
        sink.finish()?;
        Ok(summary)
    }
}

fn run_worker(
    root: &Path,
    scanner: &TreeScanner,
    inspector: &Inspector,
    cancel: &CancelHandle,
    sender: &Sender<ScanEvent>,
) -> ScanSummary {
    scan(root, scanner, inspector, cancel, |event| match sender.send(event) {
        Ok(()) => true,
        Err(_) => {
            debug!("Event receiver dropped; stopping scan");
            false
        },
    })
}
