//! Open-Meteo historical weather archive client.
//!
//! One request fetches the `weather_code` series for a whole day, so the
//! client keeps every fetched day for the rest of the run and answers later
//! hours at the same coordinate from memory.
//!
//! See <https://open-meteo.com/en/docs/historical-weather-api>

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use incident_log_models::Coordinate;
use tokio::sync::Mutex;

use crate::{WeatherError, WeatherLookup};

/// Cache key: exact coordinate bits plus the calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct DayKey {
    latitude: u64,
    longitude: u64,
    date: NaiveDate,
}

impl DayKey {
    const fn new(coordinate: Coordinate, date: NaiveDate) -> Self {
        Self {
            latitude: coordinate.latitude.to_bits(),
            longitude: coordinate.longitude.to_bits(),
            date,
        }
    }
}

/// Hourly weather codes from the Open-Meteo archive.
#[derive(Debug)]
pub struct OpenMeteoArchive {
    client: reqwest::Client,
    base_url: String,
    days: Mutex<BTreeMap<DayKey, Vec<Option<i64>>>>,
}

impl OpenMeteoArchive {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
            days: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of distinct (coordinate, day) series fetched so far.
    pub async fn cached_days(&self) -> usize {
        self.days.lock().await.len()
    }

    async fn fetch_day(
        &self,
        coordinate: Coordinate,
        date: NaiveDate,
    ) -> Result<Vec<Option<i64>>, WeatherError> {
        let day = date.format("%Y-%m-%d").to_string();
        let latitude = coordinate.latitude.to_string();
        let longitude = coordinate.longitude.to_string();

        log::debug!("Fetching hourly weather for {latitude},{longitude} on {day}");

        let body: serde_json::Value = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("start_date", day.as_str()),
                ("end_date", day.as_str()),
                ("hourly", "weather_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_hourly(&body)
    }
}

#[async_trait]
impl WeatherLookup for OpenMeteoArchive {
    async fn weather_code(
        &self,
        coordinate: Coordinate,
        date: NaiveDate,
        hour: u32,
    ) -> Result<Option<i64>, WeatherError> {
        let key = DayKey::new(coordinate, date);

        let mut days = self.days.lock().await;
        if let Some(codes) = days.get(&key) {
            return Ok(code_at(codes, hour));
        }

        match self.fetch_day(coordinate, date).await {
            Ok(codes) => {
                let code = code_at(&codes, hour);
                days.insert(key, codes);
                Ok(code)
            }
            Err(e) => {
                // A failed day stays failed for the run.
                days.insert(key, Vec::new());
                Err(e)
            }
        }
    }
}

fn code_at(codes: &[Option<i64>], hour: u32) -> Option<i64> {
    usize::try_from(hour)
        .ok()
        .and_then(|hour| codes.get(hour))
        .copied()
        .flatten()
}

/// Extracts `hourly.weather_code` from an archive response.
///
/// Missing hours are `null` in the response and become `None`.
///
/// # Errors
///
/// Returns [`WeatherError::Parse`] if the response carries an API error or
/// has no `hourly.weather_code` array.
pub fn parse_hourly(body: &serde_json::Value) -> Result<Vec<Option<i64>>, WeatherError> {
    if body["error"].as_bool() == Some(true) {
        return Err(WeatherError::Parse {
            message: format!(
                "Open-Meteo error: {}",
                body["reason"].as_str().unwrap_or("<no reason>")
            ),
        });
    }

    let codes = body["hourly"]["weather_code"]
        .as_array()
        .ok_or_else(|| WeatherError::Parse {
            message: "Missing hourly.weather_code in Open-Meteo response".to_string(),
        })?;

    Ok(codes.iter().map(serde_json::Value::as_i64).collect())
}
