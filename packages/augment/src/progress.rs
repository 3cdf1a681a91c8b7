//! Progress hooks for [`AugmentationEngine`](crate::AugmentationEngine).

use incident_log_models::{AugmentedIncident, SideOfTown, Weather};

/// Totals reported once every incident has been augmented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AugmentSummary {
    pub incidents: usize,
    /// Incidents with a known side of town.
    pub located: usize,
    /// Incidents with a known weather code.
    pub with_weather: usize,
    /// Geocoder lookups issued, excluding cache hits.
    pub lookups: u64,
}

impl AugmentSummary {
    pub(crate) fn record(&mut self, incident: &AugmentedIncident) {
        self.incidents += 1;
        if incident.side_of_town != SideOfTown::Unknown {
            self.located += 1;
        }
        if incident.weather != Weather::Unknown {
            self.with_weather += 1;
        }
    }
}

/// Receives one call per augmented incident. All methods default to no-ops.
pub trait AugmentProgress: Send + Sync {
    fn started(&self, _incidents: usize) {}

    fn augmented(&self, _position: usize, _incident: &AugmentedIncident) {}

    fn finished(&self, _summary: &AugmentSummary) {}
}

/// Ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl AugmentProgress for NoProgress {}
