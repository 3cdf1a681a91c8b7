//! Nominatim / OpenStreetMap geocoder client.
//!
//! Used when no Google API key is configured, or as a fallback when Google
//! finds nothing. The public instance allows **1 request per second**; the
//! client enforces the configured spacing itself.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use async_trait::async_trait;
use incident_log_models::Coordinate;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{GeocodeError, Geocoder};

/// Free-form Nominatim search with client-side rate limiting.
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    query_suffix: Option<String>,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        rate_limit_ms: u64,
        query_suffix: Option<String>,
    ) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_owned(),
            query_suffix,
            min_interval: Duration::from_millis(rate_limit_ms),
            last_request: Mutex::new(None),
        })
    }

    fn query_for(&self, location: &str) -> String {
        match &self.query_suffix {
            Some(suffix) => format!("{location}, {suffix}"),
            None => location.to_owned(),
        }
    }

    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, location: &str) -> Result<Option<Coordinate>, GeocodeError> {
        self.wait_turn().await;

        let query = self.query_for(location);
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query.as_str()),
                ("countrycodes", "us"),
                ("format", "jsonv2"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinate>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    Ok(Some(Coordinate::new(lat, lon)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "35.2045813",
            "lon": "-97.4322690",
            "display_name": "1880, Classen Boulevard, Norman, Cleveland County, Oklahoma, USA"
        }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude - 35.204_581_3).abs() < 1e-6);
        assert!((result.longitude - -97.432_269).abs() < 1e-6);
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_array_body() {
        let body = serde_json::json!({"error": "Unable to geocode"});
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn appends_query_suffix() {
        let geocoder = NominatimGeocoder::new(
            "http://localhost/search",
            "test-agent",
            0,
            Some("Norman, OK".to_string()),
        )
        .unwrap();
        assert_eq!(
            geocoder.query_for("1880 CLASSEN BLVD"),
            "1880 CLASSEN BLVD, Norman, OK"
        );
    }
}
