//! Batch outcome reporting.
//!
//! Every batch operation in the core returns a `BatchReport` instead of
//! failing on partial errors: per-item failures are accumulated with the
//! item identity so callers can inspect exactly what went wrong. Only
//! systemic failures (the store itself erroring) abort a batch.

use serde::Serialize;

/// A single failed item within a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    /// Identity of the failing item (e.g. "arxiv/2301.00001").
    pub item: String,
    pub message: String,
}

/// Summary of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<BatchError>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.processed += 1;
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self) {
        self.processed += 1;
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, item: impl Into<String>, message: impl Into<String>) {
        self.processed += 1;
        self.failed += 1;
        self.errors.push(BatchError {
            item: item.into(),
            message: message.into(),
        });
    }

    /// Fold another report into this one (per-source sub-batches).
    pub fn absorb(&mut self, other: BatchReport) {
        self.processed += other.processed;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.errors.extend(other.errors);
    }
}
