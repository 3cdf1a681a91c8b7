//! Document template configuration.
//!
//! The layout constants of a daily incident summary (first-page header and
//! trailer sizes, case-number width) and the token vocabulary the
//! location/nature classifier needs are properties of one publisher's
//! template. The default template is embedded from
//! `templates/daily_incident_summary.toml`; callers may load another one
//! with [`TemplateConfig::from_toml`].

use serde::{Deserialize, Serialize};

use crate::ExtractError;

const DEFAULT_TEMPLATE: &str = include_str!("../templates/daily_incident_summary.toml");

/// What to do with an entry that cannot be tokenized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Log the entry and continue with the rest of the page.
    #[default]
    Skip,
    /// Fail extraction of the whole document.
    Abort,
}

/// A token in which a location fragment and a nature fragment were fused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundToken {
    /// The fused token exactly as it appears in the extracted text.
    pub token: String,
    /// Part appended to the location.
    pub location: String,
    /// Part appended to the nature.
    pub nature: String,
}

/// Layout and vocabulary of one incident summary template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Characters of title/column-heading text at the start of page one.
    pub first_page_header_chars: usize,
    /// Characters of trailer text at the end of page one.
    pub first_page_trailer_chars: usize,
    /// Width of a well-formed case number.
    pub case_number_width: usize,
    /// Upper-case tokens that must be routed to the nature.
    #[serde(default)]
    pub nature_exceptions: Vec<String>,
    #[serde(default)]
    pub compound_tokens: Vec<CompoundToken>,
    #[serde(default)]
    pub malformed_entries: MalformedPolicy,
}

impl TemplateConfig {
    /// Parses a template from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Template`] if the TOML is invalid or a
    /// required key is missing.
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractError> {
        let template: Self = toml::de::from_str(toml_str)?;
        template.validate()?;
        Ok(template)
    }

    /// Checks values that parse but cannot drive extraction.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidTemplate`] if `case_number_width` is
    /// zero.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.case_number_width == 0 {
            return Err(ExtractError::InvalidTemplate {
                message: "case_number_width must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for TemplateConfig {
    /// Returns the embedded daily incident summary template.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (caught by the tests below).
    fn default() -> Self {
        Self::from_toml(DEFAULT_TEMPLATE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded template: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_embedded_template() {
        let template = TemplateConfig::default();
        assert_eq!(template.first_page_header_chars, 57);
        assert_eq!(template.first_page_trailer_chars, 55);
        assert_eq!(template.case_number_width, 13);
        assert_eq!(
            template.nature_exceptions,
            vec!["MVA", "COP", "EMS", "RAMPMVA"]
        );
        assert_eq!(template.compound_tokens.len(), 3);
        assert_eq!(template.malformed_entries, MalformedPolicy::Skip);
    }

    #[test]
    fn optional_sections_default() {
        let template = TemplateConfig::from_toml(
            "first_page_header_chars = 10\nfirst_page_trailer_chars = 0\ncase_number_width = 8\n",
        )
        .unwrap();
        assert!(template.nature_exceptions.is_empty());
        assert!(template.compound_tokens.is_empty());
        assert_eq!(template.malformed_entries, MalformedPolicy::Skip);
    }

    #[test]
    fn parses_abort_policy() {
        let template = TemplateConfig::from_toml(
            "first_page_header_chars = 0\nfirst_page_trailer_chars = 0\ncase_number_width = 13\nmalformed_entries = \"abort\"\n",
        )
        .unwrap();
        assert_eq!(template.malformed_entries, MalformedPolicy::Abort);
    }

    #[test]
    fn rejects_zero_case_number_width() {
        let err = TemplateConfig::from_toml(
            "first_page_header_chars = 0\nfirst_page_trailer_chars = 0\ncase_number_width = 0\n",
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidTemplate { .. }));
    }
}
