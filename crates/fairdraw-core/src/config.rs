/// Default range adopted at session start and restored by reset.
pub const DEFAULT_START: i64 = 1;
pub const DEFAULT_N: u32 = 10;
pub const DEFAULT_K: u32 = 3;

/// The active sampling range: the closed-open universe `[start, start + n)`
/// plus the default batch size `k`.
///
/// Replaced wholesale by `generate` or a full-progress load, never updated
/// field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeConfig {
    pub start: i64,
    pub n: u32,
    pub k: u32,
}

impl RangeConfig {
    pub fn new(n: u32, k: u32, start: i64) -> Self {
        Self { start, n, k }
    }

    /// Every item in the universe, in ascending order.
    pub fn items(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.n as i64).map(move |offset| self.start + offset)
    }

    pub fn contains(&self, item: i64) -> bool {
        item >= self.start && item < self.start + self.n as i64
    }

    /// Inclusive upper bound of the universe, for messages.
    pub fn last(&self) -> i64 {
        self.start + self.n as i64 - 1
    }
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            n: DEFAULT_N,
            k: DEFAULT_K,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_cover_closed_open_universe() {
        let range = RangeConfig::new(5, 2, 10);
        let items: Vec<i64> = range.items().collect();
        assert_eq!(items, vec![10, 11, 12, 13, 14]);
        assert_eq!(range.last(), 14);
    }

    #[test]
    fn contains_respects_bounds() {
        let range = RangeConfig::new(3, 1, -1);
        assert!(!range.contains(-2));
        assert!(range.contains(-1));
        assert!(range.contains(1));
        assert!(!range.contains(2));
    }

    #[test]
    fn default_config() {
        let range = RangeConfig::default();
        assert_eq!((range.start, range.n, range.k), (1, 10, 3));
    }
}
