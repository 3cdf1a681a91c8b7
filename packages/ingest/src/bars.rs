//! Terminal progress for the `incident_log` binary.
//!
//! Two bars share one [`MultiProgress`]: a document bar that advances per
//! URL and names what each document contributed, and an incident bar that
//! shows how many incidents could be placed on the map.

use std::time::Duration;

use incident_log_augment::{AugmentProgress, AugmentSummary};
use incident_log_ingest::aggregate::{DocumentReport, FailedDocument};
use incident_log_ingest::progress::{CollectSummary, DocumentProgress};
use incident_log_models::{AugmentedIncident, SideOfTown};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

fn bar_style(color: &str) -> ProgressStyle {
    ProgressStyle::with_template(&format!(
        "{{prefix:>10}} {{wide_bar:.{color}/dim}} {{pos}}/{{len}} {{msg}}"
    ))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("##-")
}

/// Formats the per-document line shown once a document is extracted.
fn document_line(report: &DocumentReport) -> String {
    let mut line = format!("{}: {} incidents", report.url, report.entries);
    if report.skipped_entries > 0 {
        line.push_str(&format!(", {} malformed", report.skipped_entries));
    }
    if !report.empty_pages.is_empty() {
        line.push_str(&format!(", {} empty page(s)", report.empty_pages.len()));
    }
    line
}

/// One step per document URL.
pub struct DocumentBar {
    bar: ProgressBar,
}

impl DocumentBar {
    #[must_use]
    pub fn new(multi: &MultiProgress) -> Self {
        Self::attach(multi.add(ProgressBar::new(0)))
    }

    fn attach(bar: ProgressBar) -> Self {
        bar.set_style(bar_style("green"));
        bar.set_prefix("Documents");
        Self { bar }
    }
}

impl DocumentProgress for DocumentBar {
    fn started(&self, documents: usize) {
        self.bar.set_length(documents as u64);
    }

    fn fetching(&self, _index: usize, url: &str) {
        self.bar.set_message(format!("fetching {url}"));
    }

    fn extracted(&self, report: &DocumentReport) {
        self.bar.set_message(document_line(report));
        self.bar.inc(1);
    }

    fn skipped(&self, failure: &FailedDocument) {
        self.bar.set_message(format!("{}: skipped", failure.url));
        self.bar.inc(1);
    }

    fn finished(&self, summary: &CollectSummary) {
        let mut line = format!(
            "{} incidents from {} document(s)",
            summary.incidents, summary.documents
        );
        if summary.skipped_entries > 0 {
            line.push_str(&format!(", {} malformed", summary.skipped_entries));
        }
        if summary.failed > 0 {
            line.push_str(&format!(", {} unreadable", summary.failed));
        }
        self.bar.finish_with_message(line);
    }
}

/// Spins until the aggregate size is known, then one step per incident.
pub struct IncidentBar {
    bar: ProgressBar,
}

impl IncidentBar {
    #[must_use]
    pub fn new(multi: &MultiProgress) -> Self {
        Self::attach(multi.add(ProgressBar::new_spinner()))
    }

    fn attach(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::with_template("{prefix:>10} {spinner:.yellow} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Incidents");
        bar.set_message("waiting for documents");
        Self { bar }
    }
}

impl AugmentProgress for IncidentBar {
    fn started(&self, incidents: usize) {
        self.bar.set_length(incidents as u64);
        self.bar.set_style(bar_style("yellow"));
        self.bar.enable_steady_tick(Duration::from_millis(200));
    }

    fn augmented(&self, _position: usize, incident: &AugmentedIncident) {
        if incident.side_of_town == SideOfTown::Unknown {
            self.bar
                .set_message(format!("unplaced: {}", incident.entry.incident_location));
        }
        self.bar.inc(1);
    }

    fn finished(&self, summary: &AugmentSummary) {
        self.bar.disable_steady_tick();
        self.bar.finish_with_message(format!(
            "{} placed, {} with weather, {} geocoder lookup(s)",
            summary.located, summary.with_weather, summary.lookups
        ));
    }
}

/// Installs `pretty_env_logger` behind `indicatif-log-bridge`, so log lines
/// print above the bars instead of through them.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}
