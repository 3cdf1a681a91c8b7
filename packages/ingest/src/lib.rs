#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for turning published daily incident summaries into augmented
//! incident reports.
//!
//! A run fetches each document in turn, splits its pages into incident
//! entries, concatenates every document's entries, and only then augments
//! them, since ranks are computed over the whole set.

pub mod aggregate;
pub mod config;
pub mod output;
pub mod progress;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use incident_log_augment::{AugmentError, AugmentProgress, AugmentationEngine, NoProgress};
use incident_log_extract::{ExtractError, Extractor};
use incident_log_geocoder::{
    GeocodeCache, GeocodeError, Geocoder, NullGeocoder, ProviderChain, service_registry,
};
use incident_log_models::{AugmentedIncident, IncidentSet};
use incident_log_source::http::HttpDocumentSource;
use incident_log_source::pdf::PdfDocumentReader;
use incident_log_source::{DocumentReader, DocumentSource, SourceError};
use incident_log_weather::open_meteo::OpenMeteoArchive;
use incident_log_weather::{NullWeather, WeatherError, WeatherLookup};
use thiserror::Error;

use crate::aggregate::{DocumentReport, FailedDocument, IncidentAggregator};
use crate::config::RunConfig;
use crate::progress::{CollectSummary, DocumentProgress};

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Run configuration TOML is invalid.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Extraction failed (invalid template, or a malformed entry under the
    /// `abort` policy).
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Augment(#[from] AugmentError),

    /// A collaborator could not be constructed.
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a URL list: one URL per line, surrounding whitespace and blank
/// lines ignored.
#[must_use]
pub fn parse_urls(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Reads a URL list file.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be read.
pub fn read_urls(path: &Path) -> Result<Vec<String>, IngestError> {
    Ok(parse_urls(&std::fs::read_to_string(path)?))
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutput {
    /// Augmented incidents in aggregate order.
    pub incidents: Vec<AugmentedIncident>,
    pub documents: Vec<DocumentReport>,
    /// Documents skipped because they could not be fetched or read.
    pub failed: Vec<FailedDocument>,
}

/// The external collaborators a run talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub source: &'a dyn DocumentSource,
    pub reader: &'a dyn DocumentReader,
    pub geocoder: &'a dyn Geocoder,
    pub weather: &'a dyn WeatherLookup,
}

/// Owned production collaborators for the `incident_log` binary.
pub struct Services {
    source: HttpDocumentSource,
    reader: PdfDocumentReader,
    geocoder: Box<dyn Geocoder>,
    weather: Box<dyn WeatherLookup>,
}

impl Services {
    /// Builds the HTTP document source, PDF reader and lookup clients.
    ///
    /// With `offline` set, geocoding and weather are replaced by no-op
    /// lookups so every `side_of_town` and `weather` is `Unknown`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if an HTTP client cannot be built.
    pub fn connect(config: &RunConfig, offline: bool) -> Result<Self, IngestError> {
        let source = HttpDocumentSource::builder()
            .with_header("User-Agent", &config.fetch.user_agent)
            .with_retry_policy(config.fetch.retry_policy())
            .build()?;

        let (geocoder, weather): (Box<dyn Geocoder>, Box<dyn WeatherLookup>) = if offline {
            log::info!("Offline mode: skipping geocoding and weather lookups");
            (Box::new(NullGeocoder), Box::new(NullWeather))
        } else {
            let chain = ProviderChain::from_services(&service_registry::enabled_services())?;
            if chain.is_empty() {
                log::warn!("No geocoding providers available; side of town will be Unknown");
            }
            let client = reqwest::Client::builder()
                .build()
                .map_err(WeatherError::from)?;
            (
                Box::new(chain),
                Box::new(OpenMeteoArchive::new(client, &config.weather.base_url)),
            )
        };

        Ok(Self {
            source,
            reader: PdfDocumentReader,
            geocoder,
            weather,
        })
    }

    #[must_use]
    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            source: &self.source,
            reader: &self.reader,
            geocoder: self.geocoder.as_ref(),
            weather: self.weather.as_ref(),
        }
    }
}

/// One extraction and augmentation run over a list of documents.
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    extractor: Extractor,
    collaborators: Collaborators<'a>,
    document_progress: Arc<dyn DocumentProgress>,
    augment_progress: Arc<dyn AugmentProgress>,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(config: &'a RunConfig, collaborators: Collaborators<'a>) -> Self {
        Self {
            config,
            extractor: Extractor::new(config.template.clone()),
            collaborators,
            document_progress: Arc::new(NoProgress),
            augment_progress: Arc::new(NoProgress),
        }
    }

    #[must_use]
    pub fn with_progress(
        mut self,
        documents: Arc<dyn DocumentProgress>,
        augment: Arc<dyn AugmentProgress>,
    ) -> Self {
        self.document_progress = documents;
        self.augment_progress = augment;
        self
    }

    /// Fetches and extracts every document, in order.
    ///
    /// A document that cannot be fetched or read is logged, recorded as a
    /// failure and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Extract`] if the template's malformed-entry
    /// policy is `abort` and a document has a malformed entry.
    pub async fn collect(&self, urls: &[String]) -> Result<IncidentAggregator, IngestError> {
        let mut aggregator = IncidentAggregator::new();
        self.document_progress.started(urls.len());

        for (i, url) in urls.iter().enumerate() {
            self.document_progress.fetching(i, url);

            let pages = match self.read_document(url).await {
                Ok(pages) => pages,
                Err(e) => {
                    let failure = aggregator.push_failure(url, e);
                    self.document_progress.skipped(failure);
                    continue;
                }
            };

            let extraction = self.extractor.extract_document(&pages)?;
            let report = aggregator.push_document(url, pages.len(), extraction);
            self.document_progress.extracted(report);
        }

        self.document_progress.finished(&CollectSummary {
            documents: aggregator.reports().len(),
            incidents: aggregator.len(),
            skipped_entries: aggregator.reports().iter().map(|r| r.skipped_entries).sum(),
            failed: aggregator.failures().len(),
        });

        Ok(aggregator)
    }

    async fn read_document(&self, url: &str) -> Result<Vec<String>, SourceError> {
        let bytes = self.collaborators.source.fetch(url).await?;
        self.collaborators.reader.pages(&bytes)
    }

    /// Augments an aggregated set with a fresh per-run geocode cache.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Augment`] if an entry's timestamp is
    /// malformed.
    pub async fn augment(&self, set: &IncidentSet) -> Result<Vec<AugmentedIncident>, IngestError> {
        let mut cache = GeocodeCache::new();
        let incidents = AugmentationEngine::new(
            &self.config.augment,
            self.collaborators.geocoder,
            self.collaborators.weather,
        )
        .with_progress(self.augment_progress.clone())
        .augment(set, &mut cache)
        .await?;

        log::info!(
            "Geocoded {} distinct location(s) with {} lookup(s)",
            cache.len(),
            cache.lookups()
        );

        Ok(incidents)
    }

    /// Runs extraction then augmentation over `urls`.
    ///
    /// # Errors
    ///
    /// See [`Self::collect`] and [`Self::augment`].
    pub async fn run(&self, urls: &[String]) -> Result<RunOutput, IngestError> {
        let start = Instant::now();
        log::info!("Processing {} document(s)", urls.len());

        let (set, documents, failed) = self.collect(urls).await?.finish();
        let incidents = self.augment(&set).await?;

        log::info!(
            "Run complete: {} incidents, {} document(s) skipped, {:.1}s",
            incidents.len(),
            failed.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(RunOutput {
            incidents,
            documents,
            failed,
        })
    }
}
