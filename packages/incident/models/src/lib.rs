#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record types shared across the incident log pipeline.
//!
//! An [`IncidentEntry`] is the five-field record extracted from one row of
//! a daily incident summary. Once every document has been extracted the
//! entries are frozen into an [`IncidentSet`], and augmentation turns each
//! entry into an [`AugmentedIncident`] carrying the derived fields.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// `chrono` format of the `incident_time` field (e.g. `"2/25/2024 0:04"`).
pub const INCIDENT_TIME_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Rank reported for a location or nature missing from its rank table.
pub const MISSING_RANK: i64 = -1;

/// Error returned when an `incident_time` value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid incident time '{value}': {reason}")]
pub struct TimestampError {
    /// The raw value that failed to parse.
    pub value: String,
    /// Parser diagnostic.
    pub reason: String,
}

/// Parses an `incident_time` string such as `"2/25/2024 0:04"`.
///
/// # Errors
///
/// Returns [`TimestampError`] if the value is not `M/D/YYYY H:MM`.
pub fn parse_incident_time(value: &str) -> Result<NaiveDateTime, TimestampError> {
    NaiveDateTime::parse_from_str(value, INCIDENT_TIME_FORMAT).map_err(|e| TimestampError {
        value: value.to_owned(),
        reason: e.to_string(),
    })
}

/// One incident row extracted from a daily incident summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentEntry {
    /// Date and time of the incident, `M/D/YYYY H:MM`.
    pub incident_time: String,
    /// Case number, at most `case_number_width` characters.
    pub incident_number: String,
    /// Free-text location, possibly empty.
    pub incident_location: String,
    /// Incident classification, possibly empty.
    pub incident_nature: String,
    /// Reporting-agency code (ORI).
    pub incident_ori: String,
}

impl IncidentEntry {
    /// Parses [`Self::incident_time`].
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] if the time is malformed.
    pub fn timestamp(&self) -> Result<NaiveDateTime, TimestampError> {
        parse_incident_time(&self.incident_time)
    }
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Compass sector of an incident relative to the town's reference point.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SideOfTown {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    /// No coordinate was available for the incident.
    Unknown,
}

impl SideOfTown {
    /// The eight 45° sectors in clockwise order starting from north.
    pub const SECTORS: [Self; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];
}

/// WMO weather code at the incident's hour, when it could be looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weather {
    /// Code reported by the weather archive.
    Code(i64),
    /// Coordinates or the archive lookup were unavailable.
    Unknown,
}

impl std::fmt::Display for Weather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

impl From<Option<i64>> for Weather {
    fn from(code: Option<i64>) -> Self {
        code.map_or(Self::Unknown, Self::Code)
    }
}

impl Serialize for Weather {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Code(code) => serializer.serialize_i64(*code),
            Self::Unknown => serializer.serialize_str("Unknown"),
        }
    }
}

/// An [`IncidentEntry`] with its derived analytical fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AugmentedIncident {
    #[serde(flatten)]
    pub entry: IncidentEntry,
    /// ISO weekday, Monday = 1.
    pub day_of_week: u32,
    /// Hour of day, 0-23.
    pub time_of_day: u32,
    /// Competition rank of the location by frequency.
    pub location_rank: i64,
    /// Competition rank of the nature by frequency.
    pub incident_rank: i64,
    /// 1 if the incident was or coincided with an EMS dispatch.
    pub ems_stat: u8,
    pub side_of_town: SideOfTown,
    pub weather: Weather,
}

/// The full, ordered collection of incidents from one run.
///
/// Built once all documents are extracted and never mutated afterwards.
/// Positions are indices into the aggregate order (document, then page,
/// then entry).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentSet {
    entries: Vec<IncidentEntry>,
}

impl IncidentSet {
    #[must_use]
    pub const fn new(entries: Vec<IncidentEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&IncidentEntry> {
        self.entries.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IncidentEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[IncidentEntry] {
        &self.entries
    }

    /// Returns the entries within `radius` positions of `position`,
    /// excluding `position` itself, in sequence order.
    pub fn neighbors(
        &self,
        position: usize,
        radius: usize,
    ) -> impl Iterator<Item = (usize, &IncidentEntry)> {
        let start = position.saturating_sub(radius);
        let end = position
            .saturating_add(radius)
            .saturating_add(1)
            .min(self.entries.len());
        let start = start.min(end);

        self.entries[start..end]
            .iter()
            .enumerate()
            .map(move |(offset, entry)| (start + offset, entry))
            .filter(move |(i, _)| *i != position)
    }
}

impl FromIterator<IncidentEntry> for IncidentSet {
    fn from_iter<T: IntoIterator<Item = IncidentEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IncidentSet {
    type Item = &'a IncidentEntry;
    type IntoIter = std::slice::Iter<'a, IncidentEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
