//! Location/nature classification.
//!
//! The source PDF prints the location and nature columns side by side with
//! nothing but a space between them. Address tokens come first and are
//! almost always numeric or upper case, while natures are title case
//! ("Traffic Stop", "Mutual Aid"). The classifier walks the middle tokens
//! once, left to right, and routes each one with the first matching
//! [`Rule`]:
//!
//! 1. fused compound tokens (`HWYMotorist`) are split across both sides;
//! 2. once the nature has started, everything else is nature;
//! 3. upper-case nature abbreviations (`MVA`, `COP`, ...) go to nature;
//! 4. address-shaped tokens go to location;
//! 5. anything else starts the nature.
//!
//! A repair pass then moves a trailing multi-digit number from the
//! location to the front of the nature.

use std::collections::BTreeSet;

use crate::config::TemplateConfig;
use crate::repair;

/// The two token lists built up while classifying an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub location: Vec<String>,
    pub nature: Vec<String>,
}

impl Classification {
    /// Joins each side with single spaces into `(location, nature)`.
    #[must_use]
    pub fn into_strings(self) -> (String, String) {
        (self.location.join(" "), self.nature.join(" "))
    }
}

/// Where a matching rule sends the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Location,
    Nature,
    /// Append `location` to the location and `nature` to the nature.
    Split { location: String, nature: String },
}

type Predicate = Box<dyn Fn(&str, &Classification) -> bool + Send + Sync>;

/// One predicate/route pair of the classifier.
pub struct Rule {
    name: String,
    predicate: Predicate,
    route: Route,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        route: Route,
        predicate: impl Fn(&str, &Classification) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
            route,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, token: &str, state: &Classification) -> bool {
        (self.predicate)(token, state)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

/// Non-empty and every character an ASCII digit.
#[must_use]
pub fn is_decimal(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Non-empty and every character numeric (including non-ASCII numerals).
#[must_use]
pub fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_numeric)
}

/// True when the token has at least one cased character and no lower-case
/// ones, so `"I-35"` and `"10TH"` qualify but `"1880"` does not.
#[must_use]
pub fn is_upper(token: &str) -> bool {
    let mut has_cased = false;
    for c in token.chars() {
        if c.is_lowercase() {
            return false;
        }
        has_cased |= c.is_uppercase();
    }
    has_cased
}

/// Shape of a token that belongs to an address.
#[must_use]
pub fn is_address_token(token: &str) -> bool {
    is_decimal(token) || is_upper(token) || token == "/" || token.contains(';') || token == "1/2"
}

/// Ordered rule evaluator for the middle tokens of an entry.
#[derive(Debug)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    /// Builds a classifier from an explicit rule list. The last rule should
    /// match every token; unmatched tokens are routed to the nature.
    #[must_use]
    pub const fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Builds the standard rule list from a template's vocabulary.
    #[must_use]
    pub fn new(template: &TemplateConfig) -> Self {
        let mut rules: Vec<Rule> = template
            .compound_tokens
            .iter()
            .map(|compound| {
                let token = compound.token.clone();
                Rule::new(
                    format!("compound {}", compound.token),
                    Route::Split {
                        location: compound.location.clone(),
                        nature: compound.nature.clone(),
                    },
                    move |t, _| t == token,
                )
            })
            .collect();

        let exceptions: BTreeSet<String> = template.nature_exceptions.iter().cloned().collect();

        rules.push(Rule::new("nature started", Route::Nature, |_, state| {
            !state.nature.is_empty()
        }));
        rules.push(Rule::new("nature exception", Route::Nature, move |t, _| {
            exceptions.contains(t)
        }));
        rules.push(Rule::new("address token", Route::Location, |t, _| {
            is_address_token(t)
        }));
        rules.push(Rule::new("nature", Route::Nature, |_, _| true));

        Self::from_rules(rules)
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Routes every token, then runs the trailing-numeral repair.
    #[must_use]
    pub fn classify(&self, tokens: &[&str]) -> Classification {
        let mut state = Classification::default();

        for &token in tokens {
            let route = self
                .rules
                .iter()
                .find(|rule| rule.matches(token, &state))
                .map(|rule| &rule.route);

            match route {
                Some(Route::Location) => state.location.push(token.to_string()),
                Some(Route::Nature) | None => state.nature.push(token.to_string()),
                Some(Route::Split { location, nature }) => {
                    state.location.push(location.clone());
                    state.nature.push(nature.clone());
                }
            }
        }

        if let Err(e) = repair::move_trailing_numeral(&mut state) {
            log::debug!("Keeping unrepaired location/nature split for {tokens:?}: {e}");
        }

        state
    }

    /// Classifies `tokens` and joins the result into `(location, nature)`.
    #[must_use]
    pub fn location_and_nature(&self, tokens: &[&str]) -> (String, String) {
        self.classify(tokens).into_strings()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&TemplateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(tokens: &[&str]) -> (String, String) {
        Classifier::default().location_and_nature(tokens)
    }

    #[test]
    fn splits_address_from_title_case_nature() {
        assert_eq!(
            classify(&["1880", "CLASSEN", "BLVD", "Traffic", "Stop"]),
            ("1880 CLASSEN BLVD".to_string(), "Traffic Stop".to_string())
        );
    }

    #[test]
    fn splits_rampmva() {
        assert_eq!(
            classify(&["RAMPMVA"]),
            ("RAMP".to_string(), "MVA".to_string())
        );
    }

    #[test]
    fn splits_hwy_motorist() {
        assert_eq!(
            classify(&["HWYMotorist"]),
            ("HWY".to_string(), "Motorist".to_string())
        );
    }

    #[test]
    fn splits_compound_even_after_nature_started() {
        assert_eq!(
            classify(&["I", "35", "SB", "Assist", "RAMPMotorist", "Assist"]),
            (
                "I 35 SB RAMP".to_string(),
                "Assist Motorist Assist".to_string()
            )
        );
    }

    #[test]
    fn nature_exceptions_start_the_nature() {
        assert_eq!(
            classify(&["W", "MAIN", "ST", "MVA", "With", "Injuries"]),
            ("W MAIN ST".to_string(), "MVA With Injuries".to_string())
        );
        assert_eq!(
            classify(&["1200", "ALAMEDA", "ST", "COP"]),
            ("1200 ALAMEDA ST".to_string(), "COP".to_string())
        );
        assert_eq!(
            classify(&["EMS", "Assist"]),
            (String::new(), "EMS Assist".to_string())
        );
    }

    #[test]
    fn upper_case_after_nature_start_stays_nature() {
        assert_eq!(
            classify(&["100", "E", "MAIN", "ST", "Check", "OK", "DOC"]),
            ("100 E MAIN ST".to_string(), "Check OK DOC".to_string())
        );
    }

    #[test]
    fn address_punctuation_tokens_stay_in_location() {
        assert_eq!(
            classify(&["2000", "1/2", "W", "LINDSEY", "ST", "/", "JENKINS", "AVE", "Alarm"]),
            (
                "2000 1/2 W LINDSEY ST / JENKINS AVE".to_string(),
                "Alarm".to_string()
            )
        );
        assert_eq!(
            classify(&["35.2;-97.4", "Welfare", "Check"]),
            ("35.2;-97.4".to_string(), "Welfare Check".to_string())
        );
    }

    #[test]
    fn moves_trailing_multi_digit_numeral_to_nature() {
        assert_eq!(
            classify(&["1000", "E", "ROBINSON", "ST", "911", "Call", "Nature", "Unknown"]),
            (
                "1000 E ROBINSON ST".to_string(),
                "911 Call Nature Unknown".to_string()
            )
        );
    }

    #[test]
    fn keeps_trailing_single_digit_in_location() {
        assert_eq!(
            classify(&["HWY", "9", "Motorist", "Assist"]),
            ("HWY 9".to_string(), "Motorist Assist".to_string())
        );
    }

    #[test]
    fn all_numeric_location_loses_only_its_last_token() {
        assert_eq!(
            classify(&["1880", "911"]),
            ("1880".to_string(), "911".to_string())
        );
    }

    #[test]
    fn nature_only_entry_has_empty_location() {
        assert_eq!(
            classify(&["Welfare", "Check"]),
            (String::new(), "Welfare Check".to_string())
        );
    }

    #[test]
    fn upper_case_shapes() {
        assert!(is_upper("I-35"));
        assert!(is_upper("10TH"));
        assert!(!is_upper("1880"));
        assert!(!is_upper("HWYMotorist"));
        assert!(!is_upper("/"));
    }

    #[test]
    fn new_exception_token_needs_only_configuration() {
        let mut template = TemplateConfig::default();
        template.nature_exceptions.push("DUI".to_string());
        let classifier = Classifier::new(&template);
        assert_eq!(
            classifier.location_and_nature(&["MAIN", "ST", "DUI"]),
            ("MAIN ST".to_string(), "DUI".to_string())
        );
    }

    #[test]
    fn rule_order_puts_compounds_first() {
        let classifier = Classifier::default();
        let names: Vec<&str> = classifier.rules().iter().map(Rule::name).collect();
        assert_eq!(
            names,
            vec![
                "compound HWYMotorist",
                "compound RAMPMotorist",
                "compound RAMPMVA",
                "nature started",
                "nature exception",
                "address token",
                "nature",
            ]
        );
    }
}
