/// Files processed against the estimated total.
///
/// The total comes from a separate counting pass, so `processed` can end up
/// above or below it if the tree changes during the scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScanProgress {
    total: u64,
    processed: u64,
}

impl ScanProgress {
    pub fn new(total: u64) -> Self {
        Self { total, processed: 0 }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Counts one more file and returns the new state.
    pub fn advance(&mut self) -> Self {
        self.processed += 1;
        *self
    }

    /// Files still expected, never negative.
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.processed)
    }
}
