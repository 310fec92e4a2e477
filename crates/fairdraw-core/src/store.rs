use crate::config::RangeConfig;
use std::collections::HashMap;

/// Cumulative appearance counts, keyed by item.
///
/// An absent key means "never selected", not invalid — `get` reads it as
/// zero. Keys outside the active range are legal stale state left over from
/// a prior range; they persist until an explicit clean or a load replaces
/// the whole map.
#[derive(Debug, Clone, Default)]
pub struct CounterStore {
    counts: HashMap<i64, u64>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored count, or zero if the item was never selected.
    pub fn get(&self, item: i64) -> u64 {
        self.counts.get(&item).copied().unwrap_or(0)
    }

    /// Bump an item by one, creating the entry if absent.
    pub fn increment(&mut self, item: i64) {
        *self.counts.entry(item).or_insert(0) += 1;
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Drop every entry outside `range`. Returns how many were removed.
    pub fn retain_within(&mut self, range: &RangeConfig) -> usize {
        let before = self.counts.len();
        self.counts.retain(|&item, _| range.contains(item));
        before - self.counts.len()
    }

    /// Wholesale replacement, used by the load operations.
    pub fn replace_all(&mut self, counts: HashMap<i64, u64>) {
        self.counts = counts;
    }

    /// Keys outside `range`, sorted ascending. Empty when the store is
    /// consistent with the active range.
    pub fn keys_outside(&self, range: &RangeConfig) -> Vec<i64> {
        let mut outside: Vec<i64> = self
            .counts
            .keys()
            .copied()
            .filter(|&item| !range.contains(item))
            .collect();
        outside.sort_unstable();
        outside
    }

    /// Read-only `(item, count)` snapshot sorted by item ascending.
    pub fn snapshot(&self) -> Vec<(i64, u64)> {
        let mut rows: Vec<(i64, u64)> = self.counts.iter().map(|(&i, &c)| (i, c)).collect();
        rows.sort_unstable_by_key(|&(item, _)| item);
        rows
    }

    pub fn counts(&self) -> &HashMap<i64, u64> {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_reads_as_zero() {
        let store = CounterStore::new();
        assert_eq!(store.get(42), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn increment_creates_and_accumulates() {
        let mut store = CounterStore::new();
        store.increment(7);
        store.increment(7);
        store.increment(-3);
        assert_eq!(store.get(7), 2);
        assert_eq!(store.get(-3), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn retain_within_prunes_only_outside_keys() {
        let mut store = CounterStore::new();
        for item in [1, 2, 3, 10, 11] {
            store.increment(item);
        }
        store.increment(2);

        let removed = store.retain_within(&RangeConfig::new(5, 1, 1));
        assert_eq!(removed, 2);
        assert_eq!(store.snapshot(), vec![(1, 1), (2, 2), (3, 1)]);
    }

    #[test]
    fn keys_outside_is_sorted() {
        let mut store = CounterStore::new();
        for item in [15, 2, 12, 3] {
            store.increment(item);
        }
        let outside = store.keys_outside(&RangeConfig::new(5, 1, 1));
        assert_eq!(outside, vec![12, 15]);
    }

    #[test]
    fn replace_all_swaps_contents() {
        let mut store = CounterStore::new();
        store.increment(1);
        store.replace_all(HashMap::from([(9, 4), (8, 0)]));
        assert_eq!(store.get(1), 0);
        assert_eq!(store.snapshot(), vec![(8, 0), (9, 4)]);
    }

    #[test]
    fn snapshot_sorted_by_item() {
        let mut store = CounterStore::new();
        for item in [5, -1, 3] {
            store.increment(item);
        }
        assert_eq!(store.snapshot(), vec![(-1, 1), (3, 1), (5, 1)]);
    }

    #[test]
    fn clear_empties_the_map() {
        let mut store = CounterStore::new();
        store.increment(1);
        store.clear();
        assert!(store.is_empty());
    }
}
