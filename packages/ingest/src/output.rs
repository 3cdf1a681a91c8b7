//! Report writers for augmented incidents.

use std::io::Write;

use incident_log_models::AugmentedIncident;

use crate::IngestError;

/// Column headings of the tab-separated report.
pub const TSV_HEADERS: [&str; 8] = [
    "Day of the Week",
    "Time of Day",
    "Weather",
    "Location Rank",
    "Side of Town",
    "Incident Rank",
    "Nature",
    "EMSSTAT",
];

/// Formats one incident as a tab-separated report row.
#[must_use]
pub fn tsv_row(incident: &AugmentedIncident) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        incident.day_of_week,
        incident.time_of_day,
        incident.weather,
        incident.location_rank,
        incident.side_of_town,
        incident.incident_rank,
        incident.entry.incident_nature,
        incident.ems_stat,
    )
}

/// Writes the header row, then one row per incident.
///
/// Nothing, not even the header, is written for an empty run.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if writing fails.
pub fn write_tsv<W: Write>(out: &mut W, incidents: &[AugmentedIncident]) -> Result<(), IngestError> {
    if incidents.is_empty() {
        return Ok(());
    }

    writeln!(out, "{}", TSV_HEADERS.join("\t"))?;
    for incident in incidents {
        writeln!(out, "{}", tsv_row(incident))?;
    }
    out.flush()?;

    Ok(())
}

/// Writes the incidents as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`IngestError`] if serialization or writing fails.
pub fn write_json<W: Write>(out: &mut W, incidents: &[AugmentedIncident]) -> Result<(), IngestError> {
    serde_json::to_writer_pretty(&mut *out, incidents)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use incident_log_models::{IncidentEntry, SideOfTown, Weather};

    use super::*;

    fn incident() -> AugmentedIncident {
        AugmentedIncident {
            entry: IncidentEntry {
                incident_time: "2/25/2024 0:04".to_string(),
                incident_number: "2024-00012345".to_string(),
                incident_location: "1880 CLASSEN BLVD".to_string(),
                incident_nature: "Traffic Stop".to_string(),
                incident_ori: "OK0140200".to_string(),
            },
            day_of_week: 7,
            time_of_day: 0,
            location_rank: 1,
            incident_rank: 3,
            ems_stat: 0,
            side_of_town: SideOfTown::SE,
            weather: Weather::Code(3),
        }
    }

    #[test]
    fn tsv_has_header_then_rows() {
        let mut unknown = incident();
        unknown.side_of_town = SideOfTown::Unknown;
        unknown.weather = Weather::Unknown;

        let mut buf = Vec::new();
        write_tsv(&mut buf, &[incident(), unknown]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Day of the Week\tTime of Day\tWeather\tLocation Rank\tSide of Town\tIncident Rank\tNature\tEMSSTAT",
                "7\t0\t3\t1\tSE\t3\tTraffic Stop\t0",
                "7\t0\tUnknown\t1\tUnknown\t3\tTraffic Stop\t0",
            ]
        );
    }

    #[test]
    fn empty_run_writes_nothing() {
        let mut buf = Vec::new();
        write_tsv(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn json_flattens_entry_fields() {
        let mut buf = Vec::new();
        write_json(&mut buf, &[incident()]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value[0]["incident_location"], "1880 CLASSEN BLVD");
        assert_eq!(value[0]["side_of_town"], "SE");
        assert_eq!(value[0]["weather"], 3);
        assert_eq!(value[0]["location_rank"], 1);
    }
}
