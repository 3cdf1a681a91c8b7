#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived fields for an aggregated set of incidents.
//!
//! Augmentation runs once every document has been extracted, because the
//! location and nature ranks are computed over the whole set. For each
//! entry, in order, it derives the weekday and hour, both ranks, the EMS
//! co-occurrence flag, and (through the geocoder and weather collaborators)
//! the side of town and weather code.

pub mod direction;
pub mod ems;
pub mod progress;
pub mod rank;

use std::sync::Arc;

use chrono::{Datelike, Timelike};
use incident_log_geocoder::{GeocodeCache, Geocoder};
use incident_log_models::{
    AugmentedIncident, Coordinate, IncidentSet, TimestampError, Weather,
};
use incident_log_weather::WeatherLookup;
use serde::Deserialize;
use thiserror::Error;

pub use progress::{AugmentProgress, AugmentSummary, NoProgress};
pub use rank::RankTable;

/// Errors from augmentation.
#[derive(Debug, Error)]
pub enum AugmentError {
    /// An entry's `incident_time` could not be parsed.
    #[error("incident {position} has a malformed timestamp: {source}")]
    Timestamp {
        /// Aggregate position of the entry.
        position: usize,
        #[source]
        source: TimestampError,
    },
}

/// `[augment]` section of the run configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Town center that side-of-town bearings are measured from.
    pub reference_point: Coordinate,
    /// Agency code marking an EMS dispatch row.
    pub ems_dispatch_code: String,
    /// Positions searched on each side for a coinciding dispatch.
    pub ems_window: usize,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            reference_point: Coordinate::new(35.220_833, -97.443_611),
            ems_dispatch_code: "EMSSTAT".to_string(),
            ems_window: 3,
        }
    }
}

/// Location and nature rank tables for one aggregated set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranks {
    pub location: RankTable,
    pub nature: RankTable,
}

impl Ranks {
    #[must_use]
    pub fn build(set: &IncidentSet) -> Self {
        Self {
            location: RankTable::build(set.iter().map(|e| e.incident_location.as_str())),
            nature: RankTable::build(set.iter().map(|e| e.incident_nature.as_str())),
        }
    }
}

/// Computes [`AugmentedIncident`]s from an [`IncidentSet`].
pub struct AugmentationEngine<'a> {
    config: &'a AugmentConfig,
    geocoder: &'a dyn Geocoder,
    weather: &'a dyn WeatherLookup,
    progress: Arc<dyn AugmentProgress>,
}

impl<'a> AugmentationEngine<'a> {
    #[must_use]
    pub fn new(
        config: &'a AugmentConfig,
        geocoder: &'a dyn Geocoder,
        weather: &'a dyn WeatherLookup,
    ) -> Self {
        Self {
            config,
            geocoder,
            weather,
            progress: Arc::new(NoProgress),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn AugmentProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Augments every entry of `set`, in order.
    ///
    /// Geocoding results are kept in `cache`, so repeated locations are
    /// only looked up once per run. Lookup failures degrade `side_of_town`
    /// and `weather` to `Unknown`.
    ///
    /// # Errors
    ///
    /// Returns [`AugmentError::Timestamp`] for the first entry whose
    /// `incident_time` is malformed. Nothing is returned for the set in
    /// that case.
    pub async fn augment(
        &self,
        set: &IncidentSet,
        cache: &mut GeocodeCache,
    ) -> Result<Vec<AugmentedIncident>, AugmentError> {
        let ranks = Ranks::build(set);
        log::debug!(
            "Ranked {} distinct locations and {} distinct natures",
            ranks.location.len(),
            ranks.nature.len()
        );

        self.progress.started(set.len());

        let mut summary = AugmentSummary::default();
        let mut augmented = Vec::with_capacity(set.len());

        for (position, entry) in set.iter().enumerate() {
            let timestamp = entry
                .timestamp()
                .map_err(|source| AugmentError::Timestamp { position, source })?;

            let coordinate = cache.resolve(self.geocoder, &entry.incident_location).await;
            let weather = match coordinate {
                Some(coordinate) => self.weather_at(coordinate, timestamp).await,
                None => Weather::Unknown,
            };

            let incident = AugmentedIncident {
                entry: entry.clone(),
                day_of_week: timestamp.weekday().number_from_monday(),
                time_of_day: timestamp.hour(),
                location_rank: ranks.location.rank_or_missing(&entry.incident_location),
                incident_rank: ranks.nature.rank_or_missing(&entry.incident_nature),
                ems_stat: ems::ems_stat(
                    set,
                    position,
                    &self.config.ems_dispatch_code,
                    self.config.ems_window,
                ),
                side_of_town: direction::side_of_town(self.config.reference_point, coordinate),
                weather,
            };

            summary.record(&incident);
            self.progress.augmented(position, &incident);
            augmented.push(incident);
        }

        summary.lookups = cache.lookups();
        self.progress.finished(&summary);

        Ok(augmented)
    }

    async fn weather_at(&self, coordinate: Coordinate, timestamp: chrono::NaiveDateTime) -> Weather {
        match self
            .weather
            .weather_code(coordinate, timestamp.date(), timestamp.hour())
            .await
        {
            Ok(code) => Weather::from(code),
            Err(e) => {
                log::warn!("Weather unavailable for {timestamp}: {e}");
                Weather::Unknown
            }
        }
    }
}
