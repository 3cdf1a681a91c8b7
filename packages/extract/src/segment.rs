//! Page segmentation.
//!
//! Extracted page text has no row delimiters, but every incident row opens
//! with its date. A page is cut immediately before each `M/D/YYYY` match,
//! after the template's first-page header and trailer are removed. On the
//! last page the final segment is the report footer and is discarded.

use std::sync::LazyLock;

use regex::Regex;

/// Date that opens each incident row (e.g. `2/25/2024`).
static ENTRY_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").expect("valid regex"));

/// Where a page sits in its document, which decides the trimming applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePosition {
    /// Page one: carries the title and column headings.
    First,
    /// Any page between the first and the last.
    Body,
    /// Final page: ends with the report footer.
    Last,
}

impl PagePosition {
    /// Classifies page `index` (zero-based) of a `total`-page document.
    ///
    /// A single-page document is treated as [`PagePosition::First`]; its
    /// footer falls inside the first-page trailer.
    #[must_use]
    pub const fn of(index: usize, total: usize) -> Self {
        if index == 0 {
            Self::First
        } else if index + 1 >= total {
            Self::Last
        } else {
            Self::Body
        }
    }
}

/// Removes `header` characters from the start and `trailer` characters from
/// the end of `text`. Yields an empty string when the two overlap.
#[must_use]
pub fn strip_first_page(text: &str, header: usize, trailer: usize) -> &str {
    let char_count = text.chars().count();
    let start_char = header.min(char_count);
    let end_char = char_count.saturating_sub(trailer);
    if start_char >= end_char {
        return "";
    }

    let byte_at = |char_idx: usize| {
        text.char_indices()
            .nth(char_idx)
            .map_or(text.len(), |(byte, _)| byte)
    };

    &text[byte_at(start_char)..byte_at(end_char)]
}

/// Lazily yields the incident-entry segments of one page body.
#[derive(Debug)]
pub struct Segments<'a> {
    text: &'a str,
    boundaries: regex::Matches<'static, 'a>,
    /// Start of the segment not yet emitted; `None` once exhausted.
    cursor: Option<usize>,
    drop_last: bool,
}

impl<'a> Segments<'a> {
    fn new(text: &'a str, drop_last: bool) -> Self {
        let re: &'static Regex = &ENTRY_DATE_RE;
        let text = text.trim();
        Self {
            text,
            boundaries: re.find_iter(text),
            cursor: Some(0),
            drop_last,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.cursor?;
            if let Some(boundary) = self.boundaries.next() {
                self.cursor = Some(boundary.start());
                let segment = &self.text[start..boundary.start()];
                if !segment.is_empty() {
                    return Some(segment);
                }
            } else {
                self.cursor = None;
                let segment = &self.text[start..];
                if self.drop_last || segment.is_empty() {
                    return None;
                }
                return Some(segment);
            }
        }
    }
}

/// Splits one page into incident-entry strings in document order.
///
/// `header` and `trailer` are only applied to the first page.
#[must_use]
pub fn segment_page(
    text: &str,
    position: PagePosition,
    header: usize,
    trailer: usize,
) -> Segments<'_> {
    match position {
        PagePosition::First => Segments::new(strip_first_page(text, header, trailer), false),
        PagePosition::Body => Segments::new(text, false),
        PagePosition::Last => Segments::new(text, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "2/25/2024 0:04 2024-00013477 1880 CLASSEN BLVD Traffic Stop OK0140200\n\
                        2/25/2024 0:06 2024-00013489 2120 W BROOKS ST Mutual Aid OK0140200\n";

    #[test]
    fn classifies_page_positions() {
        assert_eq!(PagePosition::of(0, 3), PagePosition::First);
        assert_eq!(PagePosition::of(1, 3), PagePosition::Body);
        assert_eq!(PagePosition::of(2, 3), PagePosition::Last);
        assert_eq!(PagePosition::of(0, 1), PagePosition::First);
    }

    #[test]
    fn splits_before_each_date() {
        let segments: Vec<&str> = segment_page(BODY, PagePosition::Body, 0, 0).collect();
        assert_eq!(segments.len(), 2);
        assert!(segments[0].starts_with("2/25/2024 0:04"));
        assert!(segments[1].starts_with("2/25/2024 0:06"));
        assert!(segments[1].ends_with("OK0140200"));
    }

    #[test]
    fn keeps_leading_text_before_first_date() {
        let segments: Vec<&str> =
            segment_page("carryover 2/25/2024 0:04 X", PagePosition::Body, 0, 0).collect();
        assert_eq!(segments, vec!["carryover ", "2/25/2024 0:04 X"]);
    }

    #[test]
    fn two_digit_month_stays_in_one_segment() {
        let segments: Vec<&str> =
            segment_page("12/25/2024 0:04 A 11/3/2024 1:00 B", PagePosition::Body, 0, 0)
                .collect();
        assert_eq!(segments, vec!["12/25/2024 0:04 A ", "11/3/2024 1:00 B"]);
    }

    #[test]
    fn last_page_drops_footer_segment() {
        let text = format!("{BODY}3/1/2024 10:50 Footer generated");
        let segments: Vec<&str> = segment_page(&text, PagePosition::Last, 0, 0).collect();
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| !s.contains("Footer")));
    }

    #[test]
    fn last_page_without_dates_is_empty() {
        assert_eq!(
            segment_page("just a footer", PagePosition::Last, 0, 0).count(),
            0
        );
    }

    #[test]
    fn first_page_strips_header_and_trailer() {
        let text = format!("HEADER----{BODY}TRAILER");
        let segments: Vec<&str> = segment_page(&text, PagePosition::First, 10, 7).collect();
        assert_eq!(segments.len(), 2);
        assert!(segments[0].starts_with("2/25/2024"));
        assert!(!segments[1].contains("TRAILER"));
    }

    #[test]
    fn header_and_trailer_are_ignored_on_body_pages() {
        let segments: Vec<&str> = segment_page(BODY, PagePosition::Body, 10, 7).collect();
        assert!(segments[0].starts_with("2/25/2024 0:04"));
    }

    #[test]
    fn strip_counts_characters_not_bytes() {
        assert_eq!(strip_first_page("ééabcéé", 2, 2), "abc");
    }

    #[test]
    fn strip_of_short_page_is_empty() {
        assert_eq!(strip_first_page("short", 3, 3), "");
    }

    #[test]
    fn empty_page_yields_nothing() {
        assert_eq!(segment_page("   \n ", PagePosition::Body, 0, 0).count(), 0);
    }
}
