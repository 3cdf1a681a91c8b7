#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident entry extraction from daily incident summary page text.
//!
//! Turns the per-page text of a daily incident summary into
//! [`IncidentEntry`] records:
//!
//! 1. [`segment`] cuts each page into entry strings at date boundaries,
//!    stripping the first-page header and the last-page footer;
//! 2. [`tokenize`] slices off the date, time, case number and ORI;
//! 3. [`classify`] splits the remaining tokens into location and nature;
//! 4. [`repair`] fixes case numbers that swallowed location text.
//!
//! The layout constants and token vocabulary come from a
//! [`TemplateConfig`].

pub mod classify;
pub mod config;
pub mod repair;
pub mod segment;
pub mod tokenize;

use incident_log_models::{IncidentEntry, TimestampError};

pub use classify::Classifier;
pub use config::{MalformedPolicy, TemplateConfig};
pub use segment::PagePosition;

/// Why an entry string could not be tokenized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    /// Fewer than date, time, case number and ORI.
    #[error("expected at least 4 tokens, found {found}")]
    TooFewTokens {
        /// Number of whitespace-delimited tokens present.
        found: usize,
    },

    /// The date/time tokens did not parse.
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

/// Errors from entry extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// An entry was malformed and the template's policy is
    /// [`MalformedPolicy::Abort`].
    #[error("Malformed entry on page {page}: {reason} ({entry:?})")]
    MalformedEntry {
        /// Zero-based page index.
        page: usize,
        /// The raw entry text.
        entry: String,
        reason: MalformedReason,
    },

    /// The template TOML failed to parse.
    #[error("Template parse error: {0}")]
    Template(#[from] toml::de::Error),

    /// The template parsed but holds an unusable value.
    #[error("Invalid template: {message}")]
    InvalidTemplate {
        /// Description of the invalid value.
        message: String,
    },
}

/// Entries extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub entries: Vec<IncidentEntry>,
    /// Malformed entries dropped under [`MalformedPolicy::Skip`].
    pub skipped: usize,
}

/// Entries extracted from every page of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentExtraction {
    /// Entries in page order, then entry order.
    pub entries: Vec<IncidentEntry>,
    pub skipped_entries: usize,
    /// Zero-based indices of non-final pages that produced no entries.
    pub empty_pages: Vec<usize>,
}

/// Extracts incident entries according to one template.
#[derive(Debug)]
pub struct Extractor {
    template: TemplateConfig,
    classifier: Classifier,
}

impl Extractor {
    #[must_use]
    pub fn new(template: TemplateConfig) -> Self {
        let classifier = Classifier::new(&template);
        Self {
            template,
            classifier,
        }
    }

    #[must_use]
    pub const fn template(&self) -> &TemplateConfig {
        &self.template
    }

    /// Parses one entry string into an [`IncidentEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`MalformedReason`] if the entry has fewer than four tokens
    /// or an unparseable date/time.
    pub fn parse_entry(&self, text: &str) -> Result<IncidentEntry, MalformedReason> {
        let tokens = tokenize::tokenize(text)?;

        let (location, nature) = if tokens.middle.is_empty() {
            (String::new(), String::new())
        } else {
            self.classifier.location_and_nature(&tokens.middle)
        };

        let (incident_number, incident_location) = repair::repair_case_number(
            tokens.incident_number,
            location,
            self.template.case_number_width,
        );

        Ok(IncidentEntry {
            incident_time: tokens.time,
            incident_number,
            incident_location,
            incident_nature: nature,
            incident_ori: tokens.ori.to_string(),
        })
    }

    /// Extracts every entry from page `index` of a `total`-page document.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MalformedEntry`] for the first malformed
    /// entry when the policy is [`MalformedPolicy::Abort`].
    pub fn extract_page(
        &self,
        text: &str,
        index: usize,
        total: usize,
    ) -> Result<PageExtraction, ExtractError> {
        let position = PagePosition::of(index, total);
        let mut page = PageExtraction::default();

        for segment in segment::segment_page(
            text,
            position,
            self.template.first_page_header_chars,
            self.template.first_page_trailer_chars,
        ) {
            match self.parse_entry(segment) {
                Ok(entry) => page.entries.push(entry),
                Err(reason) => match self.template.malformed_entries {
                    MalformedPolicy::Skip => {
                        log::warn!("Skipping malformed entry on page {index}: {reason} ({segment:?})");
                        page.skipped += 1;
                    }
                    MalformedPolicy::Abort => {
                        return Err(ExtractError::MalformedEntry {
                            page: index,
                            entry: segment.to_string(),
                            reason,
                        });
                    }
                },
            }
        }

        log::debug!(
            "Page {}/{total} ({position:?}): {} entries, {} skipped",
            index + 1,
            page.entries.len(),
            page.skipped
        );

        Ok(page)
    }

    /// Extracts every entry of a document given its per-page text.
    ///
    /// # Errors
    ///
    /// Propagates [`ExtractError`] from [`Self::extract_page`].
    pub fn extract_document<S: AsRef<str>>(
        &self,
        pages: &[S],
    ) -> Result<DocumentExtraction, ExtractError> {
        let total = pages.len();
        let mut document = DocumentExtraction::default();

        for (index, text) in pages.iter().enumerate() {
            let page = self.extract_page(text.as_ref(), index, total)?;

            if page.entries.is_empty() && PagePosition::of(index, total) != PagePosition::Last {
                log::warn!("Page {} of {total} produced no incident entries", index + 1);
                document.empty_pages.push(index);
            }

            document.skipped_entries += page.skipped;
            document.entries.extend(page.entries);
        }

        Ok(document)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(TemplateConfig::default())
    }
}
