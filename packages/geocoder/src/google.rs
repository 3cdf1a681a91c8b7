//! Google Maps Geocoding API client.
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>

use async_trait::async_trait;
use incident_log_models::Coordinate;

use crate::{GeocodeError, Geocoder};

/// Geocodes free-text addresses with the Google Geocoding API.
#[derive(Debug)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
            api_key,
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn resolve(&self, location: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let body: serde_json::Value = self
            .client
            .get(&self.base_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("address", location), ("key", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await?;

        parse_response(&body)
    }
}

/// Parses a Geocoding API response, taking the first result's geometry.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinate>, GeocodeError> {
    match body["status"].as_str() {
        Some("OK") => {}
        Some("ZERO_RESULTS") => return Ok(None),
        Some("OVER_QUERY_LIMIT") => return Err(GeocodeError::RateLimited),
        other => {
            return Err(GeocodeError::Parse {
                message: format!(
                    "Google geocoder status {}: {}",
                    other.unwrap_or("<missing>"),
                    body["error_message"].as_str().unwrap_or_default()
                ),
            });
        }
    }

    let Some(location) = body["results"]
        .as_array()
        .and_then(|results| results.first())
        .map(|first| &first["geometry"]["location"])
    else {
        return Ok(None);
    };

    match (location["lat"].as_f64(), location["lng"].as_f64()) {
        (Some(lat), Some(lng)) => Ok(Some(Coordinate::new(lat, lng))),
        _ => Err(GeocodeError::Parse {
            message: "Missing lat/lng in Google geocoder result".to_string(),
        }),
    }
}
