//! Frequency rank tables for locations and natures.

use std::collections::BTreeMap;

use incident_log_models::MISSING_RANK;

/// Competition ranks keyed by location or nature string.
///
/// Keys are ordered by descending occurrence count, then ascending key.
/// Keys with equal counts share a rank, and the next count group resumes at
/// its 1-based position in that order (`1, 2, 2, 4, ...`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankTable {
    ranks: BTreeMap<String, u32>,
}

impl RankTable {
    /// Builds a table from every occurrence of every key.
    pub fn build<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for key in keys {
            *counts.entry(key).or_default() += 1;
        }

        let mut ordered: Vec<(&str, usize)> = counts.into_iter().collect();
        ordered.sort_by(|(a_key, a_count), (b_key, b_count)| {
            b_count.cmp(a_count).then_with(|| a_key.cmp(b_key))
        });

        let mut ranks = BTreeMap::new();
        let mut current_rank = 0;
        let mut last_count = None;

        for (position, (key, count)) in (1_u32..).zip(ordered) {
            if last_count != Some(count) {
                current_rank = position;
                last_count = Some(count);
            }
            ranks.insert(key.to_owned(), current_rank);
        }

        Self { ranks }
    }

    #[must_use]
    pub fn rank(&self, key: &str) -> Option<u32> {
        self.ranks.get(key).copied()
    }

    /// Rank of `key`, or [`MISSING_RANK`] if it never occurred.
    #[must_use]
    pub fn rank_or_missing(&self, key: &str) -> i64 {
        self.rank(key).map_or(MISSING_RANK, i64::from)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_share_rank_after_higher_count() {
        let table = RankTable::build(["A", "B", "C", "C"]);
        assert_eq!(table.rank("C"), Some(1));
        assert_eq!(table.rank("A"), Some(2));
        assert_eq!(table.rank("B"), Some(2));
    }

    #[test]
    fn next_group_skips_tied_positions() {
        let table = RankTable::build(["X", "X", "X", "A", "A", "B", "B", "C"]);
        assert_eq!(table.rank("X"), Some(1));
        assert_eq!(table.rank("A"), Some(2));
        assert_eq!(table.rank("B"), Some(2));
        assert_eq!(table.rank("C"), Some(4));
    }

    #[test]
    fn rank_does_not_depend_on_input_order() {
        let forward = RankTable::build(["A", "B", "B", "C", "C", "C"]);
        let backward = RankTable::build(["C", "C", "C", "B", "B", "A"]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn ranks_are_non_decreasing_as_frequency_falls() {
        let keys = ["a", "b", "b", "c", "c", "c", "d", "d", "e"];
        let table = RankTable::build(keys);

        let mut counted: Vec<(usize, &str)> = ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(|k| (keys.iter().filter(|x| **x == k).count(), k))
            .collect();
        counted.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        for pair in counted.windows(2) {
            let (hi_count, hi) = pair[0];
            let (lo_count, lo) = pair[1];
            if hi_count == lo_count {
                assert_eq!(table.rank(hi), table.rank(lo));
            } else {
                assert!(table.rank(hi) < table.rank(lo));
            }
        }
    }

    #[test]
    fn empty_string_is_a_key() {
        let table = RankTable::build(["", "", "1880 CLASSEN BLVD"]);
        assert_eq!(table.rank(""), Some(1));
        assert_eq!(table.rank("1880 CLASSEN BLVD"), Some(2));
    }

    #[test]
    fn missing_key_is_sentinel() {
        let table = RankTable::build(["A"]);
        assert_eq!(table.rank_or_missing("A"), 1);
        assert_eq!(table.rank_or_missing("Z"), MISSING_RANK);
        assert!(RankTable::build([]).is_empty());
    }
}
