//! EMS dispatch co-occurrence flag.

use incident_log_models::{IncidentEntry, IncidentSet};

fn is_dispatch(entry: &IncidentEntry, dispatch_code: &str) -> bool {
    entry.incident_ori.to_uppercase() == dispatch_code.to_uppercase()
}

/// Returns 1 if the entry at `position` was an EMS dispatch or coincided
/// with one, else 0.
///
/// An entry coincides with a dispatch when an entry within `window`
/// positions on either side carries `dispatch_code` (case-insensitive) and
/// has the exact same `incident_time` and `incident_location`. The window is
/// over aggregate position, so it crosses document boundaries.
#[must_use]
pub fn ems_stat(set: &IncidentSet, position: usize, dispatch_code: &str, window: usize) -> u8 {
    let Some(current) = set.get(position) else {
        return 0;
    };

    if is_dispatch(current, dispatch_code) {
        return 1;
    }

    let coincides = set.neighbors(position, window).any(|(_, other)| {
        is_dispatch(other, dispatch_code)
            && other.incident_time == current.incident_time
            && other.incident_location == current.incident_location
    });

    u8::from(coincides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(time: &str, location: &str, ori: &str) -> IncidentEntry {
        IncidentEntry {
            incident_time: time.to_string(),
            incident_number: "2024-00012345".to_string(),
            incident_location: location.to_string(),
            incident_nature: "Sick Person".to_string(),
            incident_ori: ori.to_string(),
        }
    }

    fn stats(set: &IncidentSet) -> Vec<u8> {
        (0..set.len())
            .map(|i| ems_stat(set, i, "EMSSTAT", 3))
            .collect()
    }

    #[test]
    fn only_dispatch_row_is_flagged_without_shared_time() {
        let set = IncidentSet::new(vec![
            entry("2/25/2024 0:04", "1880 CLASSEN BLVD", "EMSSTAT"),
            entry("2/25/2024 0:06", "2120 W BROOKS ST", "OK0140200"),
            entry("2/25/2024 0:08", "1880 CLASSEN BLVD", "OK0140200"),
        ]);
        assert_eq!(stats(&set), vec![1, 0, 0]);
    }

    #[test]
    fn shared_time_and_location_within_window_is_flagged() {
        let set = IncidentSet::new(vec![
            entry("2/25/2024 0:04", "1880 CLASSEN BLVD", "OK0140200"),
            entry("2/25/2024 0:04", "1880 CLASSEN BLVD", "14005"),
            entry("2/25/2024 0:04", "1880 CLASSEN BLVD", "EMSSTAT"),
        ]);
        assert_eq!(stats(&set), vec![1, 1, 1]);
    }

    #[test]
    fn dispatch_code_is_case_insensitive() {
        let set = IncidentSet::new(vec![
            entry("2/25/2024 0:04", "1880 CLASSEN BLVD", "emsstat"),
            entry("2/25/2024 0:04", "1880 CLASSEN BLVD", "OK0140200"),
        ]);
        assert_eq!(stats(&set), vec![1, 1]);
    }

    #[test]
    fn match_outside_window_is_ignored() {
        let mut entries = vec![entry("2/25/2024 0:04", "1880 CLASSEN BLVD", "OK0140200")];
        for minute in 10..14 {
            entries.push(entry(
                &format!("2/25/2024 0:{minute}"),
                "2120 W BROOKS ST",
                "OK0140200",
            ));
        }
        entries.push(entry("2/25/2024 0:04", "1880 CLASSEN BLVD", "EMSSTAT"));
        let set = IncidentSet::new(entries);

        // The dispatch is five positions away.
        assert_eq!(ems_stat(&set, 0, "EMSSTAT", 3), 0);
        assert_eq!(ems_stat(&set, 0, "EMSSTAT", 5), 1);
    }

    #[test]
    fn location_must_match_exactly() {
        let set = IncidentSet::new(vec![
            entry("2/25/2024 0:04", "1880 CLASSEN BLVD", "OK0140200"),
            entry("2/25/2024 0:04", "1880 CLASSEN BLVD ", "EMSSTAT"),
        ]);
        assert_eq!(stats(&set), vec![0, 1]);
    }

    #[test]
    fn position_past_end_is_zero() {
        let set = IncidentSet::new(vec![entry("2/25/2024 0:04", "", "EMSSTAT")]);
        assert_eq!(ems_stat(&set, 5, "EMSSTAT", 3), 0);
    }
}
