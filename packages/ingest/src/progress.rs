//! Document-level progress hooks for [`Pipeline::collect`](crate::Pipeline::collect).

use incident_log_augment::NoProgress;

use crate::aggregate::{DocumentReport, FailedDocument};

/// Totals reported once every document has been fetched and extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    pub documents: usize,
    pub incidents: usize,
    pub skipped_entries: usize,
    pub failed: usize,
}

/// Receives one call per document. All methods default to no-ops.
pub trait DocumentProgress: Send + Sync {
    fn started(&self, _documents: usize) {}

    /// Called before `url`, the `index`-th document, is fetched.
    fn fetching(&self, _index: usize, _url: &str) {}

    fn extracted(&self, _report: &DocumentReport) {}

    fn skipped(&self, _failure: &FailedDocument) {}

    fn finished(&self, _summary: &CollectSummary) {}
}

impl DocumentProgress for NoProgress {}
