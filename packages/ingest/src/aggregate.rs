//! Concatenation of per-document extractions into one incident set.

use incident_log_extract::DocumentExtraction;
use incident_log_models::{IncidentEntry, IncidentSet};

/// What one document contributed to the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub url: String,
    pub pages: usize,
    pub entries: usize,
    pub skipped_entries: usize,
    /// Zero-based indices of non-final pages with no entries.
    pub empty_pages: Vec<usize>,
}

/// A document that contributed nothing because it could not be retrieved
/// or read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDocument {
    pub url: String,
    pub reason: String,
}

/// Collects entries in document order, then page order, then entry order.
///
/// No entry is reordered or deduplicated.
#[derive(Debug, Default)]
pub struct IncidentAggregator {
    entries: Vec<IncidentEntry>,
    reports: Vec<DocumentReport>,
    failures: Vec<FailedDocument>,
}

impl IncidentAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every entry of one extracted document.
    pub fn push_document(
        &mut self,
        url: &str,
        pages: usize,
        extraction: DocumentExtraction,
    ) -> &DocumentReport {
        log::info!(
            "{url}: {} incidents from {pages} page(s) ({} skipped, {} empty page(s))",
            extraction.entries.len(),
            extraction.skipped_entries,
            extraction.empty_pages.len()
        );

        let report = DocumentReport {
            url: url.to_owned(),
            pages,
            entries: extraction.entries.len(),
            skipped_entries: extraction.skipped_entries,
            empty_pages: extraction.empty_pages,
        };
        self.entries.extend(extraction.entries);
        self.reports.push(report);

        &self.reports[self.reports.len() - 1]
    }

    /// Records a document that was skipped.
    pub fn push_failure(&mut self, url: &str, reason: impl std::fmt::Display) -> &FailedDocument {
        let reason = reason.to_string();
        log::warn!("Skipping {url}: {reason}");
        self.failures.push(FailedDocument {
            url: url.to_owned(),
            reason,
        });

        &self.failures[self.failures.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn reports(&self) -> &[DocumentReport] {
        &self.reports
    }

    #[must_use]
    pub fn failures(&self) -> &[FailedDocument] {
        &self.failures
    }

    /// Freezes the collected entries.
    #[must_use]
    pub fn finish(self) -> (IncidentSet, Vec<DocumentReport>, Vec<FailedDocument>) {
        (IncidentSet::new(self.entries), self.reports, self.failures)
    }
}
