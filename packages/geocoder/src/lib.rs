#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location geocoding for incident log records.
//!
//! Converts free-text incident locations to coordinates using providers
//! configured via TOML files in `services/`:
//!
//! 1. **Google Maps Geocoding API** (priority 1): requires an API key in
//!    the environment variable named by the service config; skipped when
//!    the variable is unset.
//! 2. **Nominatim / OpenStreetMap** (priority 2): free, 1 req/sec.
//!
//! Lookups during a run go through a [`GeocodeCache`], which answers
//! `"<lat>, <lon>"` literals directly, remembers every result (including
//! failures) for the rest of the run, and turns provider errors into
//! "unavailable".

pub mod google;
pub mod nominatim;
pub mod service_registry;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use incident_log_models::Coordinate;
use regex::Regex;
use thiserror::Error;

use crate::service_registry::{GeocodingService, ProviderConfig};

/// Location strings that are already a coordinate pair.
static COORDINATE_LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d{1,2}(?:\.\d+)?, ?-?\d{1,3}(?:\.\d+)?$").expect("valid regex")
});

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Resolves a location string to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns `Ok(None)` when the provider has no match.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider could not be queried.
    async fn resolve(&self, location: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

/// Parses a `"<lat>, <lon>"` location literal.
#[must_use]
pub fn parse_coordinate_literal(location: &str) -> Option<Coordinate> {
    if !COORDINATE_LITERAL_RE.is_match(location) {
        return None;
    }
    let (lat, lon) = location.split_once(',')?;
    Some(Coordinate::new(
        lat.trim().parse().ok()?,
        lon.trim().parse().ok()?,
    ))
}

/// A geocoder that never finds anything, for offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGeocoder;

#[async_trait]
impl Geocoder for NullGeocoder {
    async fn resolve(&self, _location: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(None)
    }
}

/// Tries each provider in priority order until one finds a match.
pub struct ProviderChain {
    providers: Vec<(String, Box<dyn Geocoder>)>,
}

impl ProviderChain {
    #[must_use]
    pub fn new(providers: Vec<(String, Box<dyn Geocoder>)>) -> Self {
        Self { providers }
    }

    /// Builds a chain from service configurations, skipping providers whose
    /// API key is not set.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if an HTTP client cannot be built.
    pub fn from_services(services: &[GeocodingService]) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().build()?;
        let mut providers: Vec<(String, Box<dyn Geocoder>)> = Vec::new();

        for service in services.iter().filter(|s| s.enabled) {
            let provider: Box<dyn Geocoder> = match &service.provider {
                ProviderConfig::Google {
                    base_url,
                    api_key_env,
                } => {
                    let Ok(api_key) = std::env::var(api_key_env) else {
                        log::info!("Skipping {}: {api_key_env} is not set", service.name);
                        continue;
                    };
                    Box::new(google::GoogleGeocoder::new(
                        client.clone(),
                        base_url,
                        api_key,
                    ))
                }
                ProviderConfig::Nominatim {
                    base_url,
                    rate_limit_ms,
                    query_suffix,
                    user_agent,
                } => Box::new(nominatim::NominatimGeocoder::new(
                    base_url,
                    user_agent,
                    *rate_limit_ms,
                    query_suffix.clone(),
                )?),
            };
            providers.push((service.id.clone(), provider));
        }

        log::debug!(
            "Geocoder providers: {:?}",
            providers.iter().map(|(id, _)| id).collect::<Vec<_>>()
        );

        Ok(Self::new(providers))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl Geocoder for ProviderChain {
    /// Returns the first match. Errors from one provider fall through to
    /// the next; the last error is returned only if no provider answered.
    async fn resolve(&self, location: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let mut last_error = None;
        let mut answered = false;

        for (id, provider) in &self.providers {
            match provider.resolve(location).await {
                Ok(Some(coordinate)) => return Ok(Some(coordinate)),
                Ok(None) => answered = true,
                Err(e) => {
                    log::debug!("Geocoder {id} failed for '{location}': {e}");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !answered => Err(e),
            _ => Ok(None),
        }
    }
}

/// Location → coordinate cache scoped to one pipeline run.
///
/// Both matches and misses are stored, so each distinct location is sent
/// to the provider at most once. There is no eviction.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: BTreeMap<String, Option<Coordinate>>,
    lookups: u64,
}

impl GeocodeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `location`, consulting the cache and coordinate literals
    /// before `geocoder`. Provider failures are logged and reported as
    /// unavailable.
    pub async fn resolve(&mut self, geocoder: &dyn Geocoder, location: &str) -> Option<Coordinate> {
        if let Some(coordinate) = parse_coordinate_literal(location) {
            return Some(coordinate);
        }
        if let Some(cached) = self.entries.get(location) {
            return *cached;
        }

        let result = if location.trim().is_empty() {
            None
        } else {
            self.lookups += 1;
            match geocoder.resolve(location).await {
                Ok(coordinate) => coordinate,
                Err(e) => {
                    log::warn!("Geocoding unavailable for '{location}': {e}");
                    None
                }
            }
        };

        self.entries.insert(location.to_owned(), result);
        result
    }

    /// Number of distinct locations cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of calls made to the underlying geocoder.
    #[must_use]
    pub const fn lookups(&self) -> u64 {
        self.lookups
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.lookups = 0;
    }
}
