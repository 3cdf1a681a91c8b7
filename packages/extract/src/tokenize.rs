//! Entry tokenization.
//!
//! An entry is `DATE TIME CASE_NUMBER <location and nature ...> ORI`. The
//! leading three tokens and the trailing one sit in fixed positions; the
//! tokens in between are handed to the classifier.

use incident_log_models::parse_incident_time;

use crate::MalformedReason;

/// Minimum token count of a well-formed entry: date, time, case number, ORI.
pub const MIN_ENTRY_TOKENS: usize = 4;

/// Fixed-position fields of one entry plus its unclassified middle tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedEntry<'a> {
    /// Date and time joined by a single space.
    pub time: String,
    /// Raw case-number token, before overflow repair.
    pub incident_number: &'a str,
    pub ori: &'a str,
    /// Tokens between the case number and the ORI.
    pub middle: Vec<&'a str>,
}

/// Splits one entry on whitespace into its fixed fields and middle tokens.
///
/// # Errors
///
/// Returns [`MalformedReason`] if there are fewer than
/// [`MIN_ENTRY_TOKENS`] tokens or the date/time pair does not parse.
pub fn tokenize(entry: &str) -> Result<TokenizedEntry<'_>, MalformedReason> {
    let tokens: Vec<&str> = entry.split_whitespace().collect();
    // The pattern needs MIN_ENTRY_TOKENS elements to match.
    let [date, time, incident_number, middle @ .., ori] = tokens.as_slice() else {
        return Err(MalformedReason::TooFewTokens {
            found: tokens.len(),
        });
    };

    let time = format!("{date} {time}");
    parse_incident_time(&time)?;

    Ok(TokenizedEntry {
        time,
        incident_number: *incident_number,
        ori: *ori,
        middle: middle.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_fixed_fields() {
        let entry =
            tokenize("2/25/2024 0:04 2024-00013477 1880 CLASSEN BLVD Traffic Stop OK0140200")
                .unwrap();
        assert_eq!(entry.time, "2/25/2024 0:04");
        assert_eq!(entry.incident_number, "2024-00013477");
        assert_eq!(entry.ori, "OK0140200");
        assert_eq!(
            entry.middle,
            vec!["1880", "CLASSEN", "BLVD", "Traffic", "Stop"]
        );
    }

    #[test]
    fn fixed_fields_ignore_middle_content() {
        for middle in ["", "X", "a b c d e f", "HWYMotorist ; / 1/2"] {
            let text = format!("3/1/2024 23:59 2024-00000001 {middle} EMSSTAT");
            let entry = tokenize(&text).unwrap();
            assert_eq!(entry.time, "3/1/2024 23:59");
            assert_eq!(entry.incident_number, "2024-00000001");
            assert_eq!(entry.ori, "EMSSTAT");
            assert_eq!(entry.middle.len(), middle.split_whitespace().count());
        }
    }

    #[test]
    fn four_tokens_have_empty_middle() {
        let entry = tokenize("2/25/2024 0:04 2024-00013477 OK0140200").unwrap();
        assert!(entry.middle.is_empty());
    }

    #[test]
    fn collapses_newlines_and_runs_of_spaces() {
        let entry = tokenize("2/25/2024  0:04\n2024-00013477 MAIN\n ST Alarm\nOK0140200\n").unwrap();
        assert_eq!(entry.middle, vec!["MAIN", "ST", "Alarm"]);
        assert_eq!(entry.ori, "OK0140200");
    }

    #[test]
    fn rejects_three_tokens() {
        assert_eq!(
            tokenize("2/25/2024 0:04 2024-00013477").unwrap_err(),
            MalformedReason::TooFewTokens { found: 3 }
        );
    }

    #[test]
    fn rejects_unparseable_time() {
        let err = tokenize("2/25/2024 noon 2024-00013477 OK0140200").unwrap_err();
        assert!(matches!(err, MalformedReason::Timestamp(_)));
    }
}
