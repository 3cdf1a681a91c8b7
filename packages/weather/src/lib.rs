#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Historical weather lookup for incident records.
//!
//! The only production backend is the Open-Meteo archive
//! ([`open_meteo::OpenMeteoArchive`]), which returns WMO weather codes for
//! every hour of a day. [`NullWeather`] is used in offline runs and tests.

pub mod open_meteo;

use async_trait::async_trait;
use chrono::NaiveDate;
use incident_log_models::Coordinate;
use serde::Deserialize;
use thiserror::Error;

/// Default Open-Meteo historical archive endpoint.
pub const OPEN_METEO_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Errors from weather lookups.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response did not have the expected shape.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// Resolves the weather code at a coordinate for one hour of one day.
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    /// Returns the WMO weather code, or `None` if the archive has no value
    /// for that hour.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError`] if the backend request or its response
    /// fails.
    async fn weather_code(
        &self,
        coordinate: Coordinate,
        date: NaiveDate,
        hour: u32,
    ) -> Result<Option<i64>, WeatherError>;
}

/// A lookup that never knows the weather.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullWeather;

#[async_trait]
impl WeatherLookup for NullWeather {
    async fn weather_code(
        &self,
        _coordinate: Coordinate,
        _date: NaiveDate,
        _hour: u32,
    ) -> Result<Option<i64>, WeatherError> {
        Ok(None)
    }
}

/// `[weather]` section of the run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Archive endpoint queried for hourly codes.
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: OPEN_METEO_ARCHIVE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_weather_is_always_unknown() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let code = NullWeather
            .weather_code(Coordinate::new(35.2, -97.4), date, 12)
            .await
            .unwrap();
        assert_eq!(code, None);
    }

    #[test]
    fn weather_config_defaults_to_open_meteo() {
        let config: WeatherConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_url, OPEN_METEO_ARCHIVE_URL);
    }
}
