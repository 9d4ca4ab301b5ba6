//! Grouping combinators.
//!
//! Every table in the pipeline is built from [`group_fold`]: map each item
//! to an optional key, then fold the items sharing a key into an
//! accumulator. Keys come back in order of first occurrence so callers can
//! implement "first seen wins" tie-breaks with a stable sort.

use crate::models::ValueCount;
use std::collections::HashMap;
use std::hash::Hash;

/// Group `items` by `key` and fold each group into an accumulator.
///
/// Items for which `key` returns `None` are skipped. The returned groups are
/// in the order their key was first seen.
pub fn group_fold<T, K, A>(
    items: &[T],
    key: impl Fn(&T) -> Option<K>,
    init: impl Fn() -> A,
    fold: impl Fn(&mut A, &T),
) -> Vec<(K, A)>
where
    K: Hash + Eq + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, A)> = Vec::new();

    for item in items {
        let Some(k) = key(item) else {
            continue;
        };

        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, init()));
            groups.len() - 1
        });
        fold(&mut groups[slot].1, item);
    }

    groups
}

/// Count items per key, in order of first occurrence.
pub fn count_by<T, K>(items: &[T], key: impl Fn(&T) -> Option<K>) -> Vec<(K, usize)>
where
    K: Hash + Eq + Clone,
{
    group_fold(items, key, || 0usize, |count, _| *count += 1)
}

/// Frequency table of one field, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCounts<T> {
    counts: Vec<ValueCount<T>>,
}

impl<T: Hash + Eq + Clone> ValueCounts<T> {
    /// Tally `key` over `items`. Ties keep first-occurrence order.
    pub fn tally<R>(items: &[R], key: impl Fn(&R) -> Option<T>) -> Self {
        let mut counts: Vec<ValueCount<T>> = count_by(items, key)
            .into_iter()
            .map(|(value, count)| ValueCount { value, count })
            .collect();

        // Stable sort keeps first-seen order within equal counts
        counts.sort_by_key(|vc| std::cmp::Reverse(vc.count));

        Self { counts }
    }
}

impl<T: Clone> ValueCounts<T> {
    /// The most frequent value, first-seen on ties.
    pub fn leader(&self) -> Option<&ValueCount<T>> {
        self.counts.first()
    }

    /// Every value sharing the highest count, in first-seen order.
    pub fn leaders(&self) -> Vec<ValueCount<T>> {
        match self.counts.first() {
            Some(first) => self
                .counts
                .iter()
                .take_while(|vc| vc.count == first.count)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// The `n` most frequent values.
    pub fn top(&self, n: usize) -> Vec<ValueCount<T>> {
        self.counts.iter().take(n).cloned().collect()
    }

    pub fn as_slice(&self) -> &[ValueCount<T>] {
        &self.counts
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_fold_first_occurrence_order() {
        let words = ["b", "a", "b", "c", "a", "b"];
        let groups = group_fold(
            &words,
            |w| Some(w.to_string()),
            Vec::new,
            |acc: &mut Vec<usize>, w| acc.push(w.len()),
        );

        let keys: Vec<_> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(groups[0].1.len(), 3);
    }

    #[test]
    fn test_group_fold_skips_none_keys() {
        let values = [Some(1), None, Some(1), None];
        let counts = count_by(&values, |v| *v);
        assert_eq!(counts, vec![(1, 2)]);
    }

    #[test]
    fn test_value_counts_stable_ties() {
        let items = ["x", "y", "y", "x", "z"];
        let counts = ValueCounts::tally(&items, |s| Some(*s));

        assert_eq!(counts.leader().map(|vc| vc.value), Some("x"));
        let leaders: Vec<_> = counts.leaders().iter().map(|vc| vc.value).collect();
        assert_eq!(leaders, vec!["x", "y"]);
        assert_eq!(counts.top(1).len(), 1);
        assert_eq!(counts.as_slice().last().map(|vc| vc.count), Some(1));
    }

    #[test]
    fn test_value_counts_empty() {
        let items: [Option<&str>; 2] = [None, None];
        let counts = ValueCounts::tally(&items, |v| *v);
        assert!(counts.is_empty());
        assert!(counts.leader().is_none());
        assert!(counts.leaders().is_empty());
    }
}
