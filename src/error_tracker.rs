//! Mistype bookkeeping: which character was expected and what was typed instead.

use itertools::Itertools;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const KEY_SEPARATOR: &str = "->";

/// Counts of (expected, typed) mismatches
///
/// Persisted as a map keyed `"<expected>-><typed>"`, so a confusion of
/// `e` for `r` is stored as `"e->r"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct ErrorTracker {
    pairs: BTreeMap<(char, char), u32>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one mistype. Identical characters are not a mistake and are ignored.
    pub fn record(&mut self, expected: char, typed: char) {
        if expected == typed {
            return;
        }
        let count = self.pairs.entry((expected, typed)).or_insert(0);
        *count = count.saturating_add(1);
        trace!(target: "error_tracker", "{expected:?} typed as {typed:?} ({count}x)");
    }

    pub fn count(&self, expected: char, typed: char) -> u32 {
        self.pairs.get(&(expected, typed)).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of distinct (expected, typed) pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn total_errors(&self) -> u32 {
        self.pairs.values().fold(0u32, |total, &n| total.saturating_add(n))
    }

    /// Distinct characters the user was supposed to type but missed
    pub fn problem_chars(&self) -> BTreeSet<char> {
        self.pairs.keys().map(|&(expected, _)| expected).collect()
    }

    /// Most frequent pairs first; ties keep key order
    pub fn top_pairs(&self, count: usize) -> Vec<((char, char), u32)> {
        self.pairs
            .iter()
            .map(|(&pair, &n)| (pair, n))
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .take(count)
            .collect()
    }

    /// Add another table's counts on top of ours
    pub fn merge(&mut self, other: &ErrorTracker) {
        for (&pair, &n) in &other.pairs {
            let count = self.pairs.entry(pair).or_insert(0);
            *count = count.saturating_add(n);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ((char, char), u32)> + '_ {
        self.pairs.iter().map(|(&pair, &n)| (pair, n))
    }
}

fn encode_key(expected: char, typed: char) -> String {
    format!("{expected}{KEY_SEPARATOR}{typed}")
}

fn decode_key(key: &str) -> Option<(char, char)> {
    let mut chars = key.chars();
    let expected = chars.next()?;
    let rest = chars.as_str().strip_prefix(KEY_SEPARATOR)?;
    let mut rest = rest.chars();
    let typed = rest.next()?;
    match rest.next() {
        None => Some((expected, typed)),
        Some(_) => None,
    }
}

impl From<BTreeMap<String, u32>> for ErrorTracker {
    fn from(raw: BTreeMap<String, u32>) -> Self {
        let mut pairs = BTreeMap::new();
        for (key, n) in raw {
            match decode_key(&key) {
                Some(pair) if pair.0 != pair.1 => {
                    let count: &mut u32 = pairs.entry(pair).or_insert(0);
                    *count = count.saturating_add(n);
                }
                _ => warn!(target: "error_tracker", "skipping malformed error pattern key {key:?}"),
            }
        }
        Self { pairs }
    }
}

impl From<ErrorTracker> for BTreeMap<String, u32> {
    fn from(tracker: ErrorTracker) -> Self {
        tracker
            .pairs
            .into_iter()
            .map(|((expected, typed), n)| (encode_key(expected, typed), n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_increments() {
        let mut tracker = ErrorTracker::new();
        tracker.record('e', 'r');
        tracker.record('e', 'r');
        tracker.record('a', 's');

        assert_eq!(tracker.count('e', 'r'), 2);
        assert_eq!(tracker.count('a', 's'), 1);
        assert_eq!(tracker.count('r', 'e'), 0);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.total_errors(), 3);
    }

    #[test]
    fn test_matching_chars_not_recorded() {
        let mut tracker = ErrorTracker::new();
        tracker.record('a', 'a');
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_problem_chars_are_expected_side() {
        let mut tracker = ErrorTracker::new();
        tracker.record('e', 'r');
        tracker.record('e', 'w');
        tracker.record(' ', 'x');

        let chars: Vec<char> = tracker.problem_chars().into_iter().collect();
        assert_eq!(chars, vec![' ', 'e']);
    }

    #[test]
    fn test_top_pairs_sorted_by_count() {
        let mut tracker = ErrorTracker::new();
        tracker.record('a', 's');
        for _ in 0..3 {
            tracker.record('t', 'y');
        }
        tracker.record('o', 'p');
        tracker.record('o', 'p');

        let top = tracker.top_pairs(2);
        assert_eq!(top, vec![(('t', 'y'), 3), (('o', 'p'), 2)]);
    }

    #[test]
    fn test_merge_is_additive() {
        let mut session = ErrorTracker::new();
        session.record('e', 'r');

        let mut saved = ErrorTracker::new();
        saved.record('e', 'r');
        saved.record('e', 'r');
        saved.record('q', 'w');

        session.merge(&saved);
        assert_eq!(session.count('e', 'r'), 3);
        assert_eq!(session.count('q', 'w'), 1);
    }

    #[test]
    fn test_counts_saturate_at_max() {
        let mut saved: ErrorTracker =
            serde_json::from_str(&format!(r#"{{"e->r":{}}}"#, u32::MAX)).unwrap();
        saved.record('e', 'r');
        assert_eq!(saved.count('e', 'r'), u32::MAX);

        let mut session = ErrorTracker::new();
        session.record('e', 'r');
        session.record('a', 's');
        session.merge(&saved);
        assert_eq!(session.count('e', 'r'), u32::MAX);
        assert_eq!(session.total_errors(), u32::MAX);
    }

    #[test]
    fn test_serializes_with_arrow_keys() {
        let mut tracker = ErrorTracker::new();
        tracker.record('e', 'r');
        tracker.record('e', 'r');

        let json = serde_json::to_string(&tracker).unwrap();
        assert_eq!(json, r#"{"e->r":2}"#);
    }

    #[test]
    fn test_deserializes_punctuation_pairs() {
        let tracker: ErrorTracker =
            serde_json::from_str(r#"{"-->>":1,"a->-":2," ->x":4}"#).unwrap();

        assert_eq!(tracker.count('-', '>'), 1);
        assert_eq!(tracker.count('a', '-'), 2);
        assert_eq!(tracker.count(' ', 'x'), 4);
    }

    #[test]
    fn test_malformed_keys_are_skipped() {
        let tracker: ErrorTracker =
            serde_json::from_str(r#"{"ab":1,"a->bc":2,"":3,"x->x":4,"e->r":5}"#).unwrap();

        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.count('e', 'r'), 5);
    }
}
