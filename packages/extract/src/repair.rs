//! Post-classification repairs for known extraction artifacts.

use crate::classify::{Classification, is_numeric};

/// Raised when the trailing-numeral repair has nothing to inspect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationRepairError {
    /// Every token was classified as nature.
    #[error("no location token to repair")]
    EmptyLocation,
}

/// Moves a trailing multi-digit numeral from the location to the front of
/// the nature. `"911"` after a street name is the start of
/// `"911 Call Nature Unknown"`, not a house number. Single digits (`HWY 9`)
/// stay in the location.
///
/// Returns whether a token was moved.
///
/// # Errors
///
/// Returns [`ClassificationRepairError::EmptyLocation`] if `state` has no
/// location tokens; `state` is left untouched in that case.
pub fn move_trailing_numeral(
    state: &mut Classification,
) -> Result<bool, ClassificationRepairError> {
    let last = state
        .location
        .pop()
        .ok_or(ClassificationRepairError::EmptyLocation)?;

    if is_numeric(&last) && last.chars().count() > 1 {
        state.nature.insert(0, last);
        Ok(true)
    } else {
        state.location.push(last);
        Ok(false)
    }
}

/// Splits a raw case-number token that swallowed the start of the location.
///
/// Returns the case number truncated to `width` characters and, when the
/// token was longer, the overflow text.
#[must_use]
pub fn split_case_number(raw: &str, width: usize) -> (&str, Option<&str>) {
    match raw.char_indices().nth(width) {
        Some((byte, _)) => (&raw[..byte], Some(&raw[byte..])),
        None => (raw, None),
    }
}

/// Applies the case-number overflow repair to a classified entry.
///
/// The overflow plus a single space is prepended to `location`, which may
/// leave a trailing space when the classified location was empty.
#[must_use]
pub fn repair_case_number(raw: &str, location: String, width: usize) -> (String, String) {
    match split_case_number(raw, width) {
        (number, Some(overflow)) => {
            log::debug!("Case number '{raw}' overflows into location; keeping '{number}'");
            (number.to_string(), format!("{overflow} {location}"))
        }
        (number, None) => (number.to_string(), location),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(location: &[&str], nature: &[&str]) -> Classification {
        Classification {
            location: location.iter().map(ToString::to_string).collect(),
            nature: nature.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn moves_multi_digit_numeral() {
        let mut s = state(&["100", "MAIN", "ST", "911"], &["Call"]);
        assert!(move_trailing_numeral(&mut s).unwrap());
        assert_eq!(s, state(&["100", "MAIN", "ST"], &["911", "Call"]));
    }

    #[test]
    fn leaves_single_digit() {
        let mut s = state(&["HWY", "9"], &["Motorist"]);
        assert!(!move_trailing_numeral(&mut s).unwrap());
        assert_eq!(s, state(&["HWY", "9"], &["Motorist"]));
    }

    #[test]
    fn empty_location_is_reported_and_untouched() {
        let mut s = state(&[], &["Alarm"]);
        assert_eq!(
            move_trailing_numeral(&mut s),
            Err(ClassificationRepairError::EmptyLocation)
        );
        assert_eq!(s, state(&[], &["Alarm"]));
    }

    #[test]
    fn non_numeric_last_token_is_restored() {
        let mut s = state(&["100", "MAIN", "ST"], &["Alarm"]);
        assert!(!move_trailing_numeral(&mut s).unwrap());
        assert_eq!(s, state(&["100", "MAIN", "ST"], &["Alarm"]));
    }

    #[test]
    fn splits_fifteen_character_case_number() {
        let (number, location) =
            repair_case_number("2024-0001347712", "CLASSEN BLVD".to_string(), 13);
        assert_eq!(number, "2024-00013477");
        assert_eq!(number.len(), 13);
        assert_eq!(location, "12 CLASSEN BLVD");
    }

    #[test]
    fn overflow_into_empty_location_keeps_separator() {
        let (number, location) = repair_case_number("2024-00013477N", String::new(), 13);
        assert_eq!(number, "2024-00013477");
        assert_eq!(location, "N ");
    }

    #[test]
    fn exact_width_is_untouched() {
        assert_eq!(split_case_number("2024-00013477", 13), ("2024-00013477", None));
        assert_eq!(split_case_number("2024-1", 13), ("2024-1", None));
    }
}
