use crate::codec;
use crate::config::RangeConfig;
use crate::error::SessionError;
use crate::selector;
use crate::store::CounterStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Result of a successful generate call.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Chosen items in selection order.
    pub batch: Vec<i64>,
    /// Optional stale-key warning followed by the comma-joined batch.
    pub message: String,
    pub table: Vec<(i64, u64)>,
}

/// Message plus counts table, returned by clean and counts import.
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub message: String,
    pub table: Vec<(i64, u64)>,
}

/// Display state plus the active range, returned by operations that change
/// the config and need the caller to re-sync its inputs.
#[derive(Debug, Clone)]
pub struct FullState {
    pub message: String,
    pub table: Vec<(i64, u64)>,
    pub range: RangeConfig,
}

/// One logical sampling session: the counter store plus the active range.
///
/// The session exclusively owns both; nothing else mutates them. All
/// operations are synchronous and run to completion, so callers sharing a
/// session across threads wrap it in a single mutex and hold the lock for
/// the whole operation.
///
/// The random source is injectable: [`Session::new`] seeds from entropy,
/// [`Session::with_rng`] takes a caller-provided generator for
/// deterministic tests.
pub struct Session<R: Rng = StdRng> {
    store: CounterStore,
    range: RangeConfig,
    rng: R,
}

impl Session<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for Session<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            store: CounterStore::new(),
            range: RangeConfig::default(),
            rng,
        }
    }

    /// Draw a fair batch of `k` distinct items from `[start, start + n)`.
    ///
    /// The requested config is adopted before validation, so a failed call
    /// still changes the active range. Long-standing behavior, kept as is.
    /// Counts are untouched on failure; on success every batch member is
    /// incremented exactly once, after the full batch is determined.
    pub fn generate(&mut self, n: u32, k: u32, start: i64) -> Result<BatchOutcome, SessionError> {
        self.range = RangeConfig::new(n, k, start);
        if k > n {
            return Err(SessionError::Validation { k, n });
        }

        let warning = self.stale_key_warning();
        let batch = selector::draw_batch(&self.store, &self.range, &mut self.rng);
        for &item in &batch {
            self.store.increment(item);
        }

        let batch_line = batch
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let message = match warning {
            Some(warning) => format!("{warning}\n\n{batch_line}"),
            None => batch_line,
        };

        Ok(BatchOutcome {
            batch,
            message,
            table: self.store.snapshot(),
        })
    }

    /// Clear all counts and restore the default range.
    pub fn reset(&mut self) -> FullState {
        self.store.clear();
        self.range = RangeConfig::default();
        FullState {
            message: String::new(),
            table: Vec::new(),
            range: self.range,
        }
    }

    /// Remove every count whose item lies outside the current range.
    pub fn clean(&mut self) -> DisplayState {
        let removed = self.store.retain_within(&self.range);
        let message = if removed > 0 {
            format!("removed {removed} out-of-range entries")
        } else {
            "no out-of-range entries to remove".to_string()
        };
        DisplayState {
            message,
            table: self.store.snapshot(),
        }
    }

    /// Counts-only JSON snapshot (quick save).
    pub fn export_counts(&self) -> String {
        codec::encode_counts(&self.store)
    }

    /// Full JSON snapshot: counts plus the active range.
    pub fn export_full(&self) -> String {
        codec::encode_full(&self.store, &self.range)
    }

    /// Replace all counts from a counts-only snapshot. The range config is
    /// untouched; loaded keys outside the current range produce a warning
    /// but are kept. On failure the session is unchanged.
    pub fn import_counts(&mut self, text: &str) -> Result<DisplayState, SessionError> {
        let counts = codec::decode_counts(text)?;
        self.store.replace_all(counts);

        let message = match self.stale_key_warning() {
            Some(warning) => format!("{warning}; adjust the range or load full progress"),
            None => "appearance counts loaded".to_string(),
        };
        Ok(DisplayState {
            message,
            table: self.store.snapshot(),
        })
    }

    /// Replace counts AND range from a full snapshot. On failure the
    /// session is unchanged.
    pub fn import_full(&mut self, text: &str) -> Result<FullState, SessionError> {
        let (counts, range) = codec::decode_full(text)?;
        self.store.replace_all(counts);
        self.range = range;
        Ok(FullState {
            message: "full progress restored".to_string(),
            table: self.store.snapshot(),
            range: self.range,
        })
    }

    pub fn table(&self) -> Vec<(i64, u64)> {
        self.store.snapshot()
    }

    pub fn range(&self) -> RangeConfig {
        self.range
    }

    fn stale_key_warning(&self) -> Option<String> {
        let outside = self.store.keys_outside(&self.range);
        if outside.is_empty() {
            return None;
        }
        Some(format!(
            "warning: counts contain keys outside the range [{}, {}]: {:?}",
            self.range.start,
            self.range.last(),
            outside
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session<StdRng> {
        Session::with_rng(StdRng::seed_from_u64(42))
    }

    #[test]
    fn generate_returns_k_distinct_items_and_increments_each_once() {
        let mut s = session();
        let outcome = s.generate(5, 5, 1).unwrap();

        let mut batch = outcome.batch.clone();
        batch.sort_unstable();
        assert_eq!(batch, vec![1, 2, 3, 4, 5]);
        assert_eq!(outcome.table, vec![(1, 1), (2, 1), (3, 1), (4, 1), (5, 1)]);
    }

    #[test]
    fn second_draw_breaks_ties_without_exceeding_spread_of_one() {
        let mut s = session();
        s.generate(5, 5, 1).unwrap();
        let outcome = s.generate(5, 2, 1).unwrap();

        assert_eq!(outcome.batch.len(), 2);
        let at_two = outcome.table.iter().filter(|&&(_, c)| c == 2).count();
        let at_one = outcome.table.iter().filter(|&&(_, c)| c == 1).count();
        assert_eq!((at_two, at_one), (2, 3));
    }

    #[test]
    fn validation_failure_adopts_config_but_leaves_counts_untouched() {
        let mut s = session();
        s.generate(5, 5, 1).unwrap();
        let before = s.table();

        let err = s.generate(5, 6, 1).unwrap_err();
        assert!(matches!(err, SessionError::Validation { k: 6, n: 5 }));
        assert_eq!(err.to_string(), "batch size 6 cannot exceed N=5");
        assert_eq!(s.table(), before);
        // Config is overwritten even on the failure path.
        assert_eq!(s.range(), RangeConfig::new(5, 6, 1));
    }

    #[test]
    fn repeated_draws_stay_within_spread_of_one() {
        // n=6, k=3: the minimum tier always holds at least k items, so the
        // fairness bound is strict over the whole run.
        let mut s = session();
        for _ in 0..40 {
            s.generate(6, 3, 1).unwrap();
            let table = s.table();
            let min = table.iter().map(|&(_, c)| c).min().unwrap();
            let max = table.iter().map(|&(_, c)| c).max().unwrap();
            assert!(max - min <= 1, "spread exceeded 1: {table:?}");
        }
        let total: u64 = s.table().iter().map(|&(_, c)| c).sum();
        assert_eq!(total, 40 * 3);
    }

    #[test]
    fn generate_warns_about_stale_keys_but_keeps_them() {
        let mut s = session();
        s.generate(5, 5, 1).unwrap();

        let outcome = s.generate(3, 1, 10).unwrap();
        assert!(outcome.message.contains("[10, 12]"));
        assert!(outcome.message.contains("[1, 2, 3, 4, 5]"));
        // Stale entries persist until an explicit clean.
        assert!(outcome.table.iter().any(|&(item, _)| item == 1));
    }

    #[test]
    fn clean_prunes_stale_keys_and_keeps_in_range_counts() {
        let mut s = session();
        s.generate(5, 5, 1).unwrap();
        s.generate(3, 3, 1).unwrap();

        let cleaned = s.clean();
        assert_eq!(cleaned.message, "removed 2 out-of-range entries");
        assert_eq!(cleaned.table, vec![(1, 2), (2, 2), (3, 2)]);

        let again = s.clean();
        assert_eq!(again.message, "no out-of-range entries to remove");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut s = session();
        s.generate(7, 4, 3).unwrap();

        let state = s.reset();
        assert!(state.table.is_empty());
        assert_eq!(state.range, RangeConfig::default());
        assert!(s.table().is_empty());
        assert_eq!(s.range(), RangeConfig::new(10, 3, 1));
    }

    #[test]
    fn counts_round_trip_is_idempotent() {
        let mut s = session();
        s.generate(6, 4, 1).unwrap();
        s.generate(6, 4, 1).unwrap();
        let saved = s.export_counts();
        let before = s.table();

        s.generate(6, 4, 1).unwrap();
        let restored = s.import_counts(&saved).unwrap();
        assert_eq!(restored.table, before);
        assert_eq!(restored.message, "appearance counts loaded");
    }

    #[test]
    fn counts_import_keeps_the_current_range_and_warns_on_stale_keys() {
        let mut s = session();
        s.generate(5, 2, 1).unwrap();
        let saved = s.export_counts();

        s.generate(3, 1, 100).unwrap();
        let state = s.import_counts(&saved).unwrap();
        assert!(state.message.starts_with("warning:"));
        // The range adopted by the last generate call is untouched.
        assert_eq!(s.range(), RangeConfig::new(3, 1, 100));
    }

    #[test]
    fn full_round_trip_restores_counts_and_range() {
        let mut s = session();
        s.generate(8, 3, -2).unwrap();
        let saved = s.export_full();
        let table = s.table();

        s.reset();
        let state = s.import_full(&saved).unwrap();
        assert_eq!(state.table, table);
        assert_eq!(state.range, RangeConfig::new(8, 3, -2));
        assert_eq!(state.message, "full progress restored");
        assert_eq!(s.range(), RangeConfig::new(8, 3, -2));
    }

    #[test]
    fn failed_imports_leave_the_session_unchanged() {
        let mut s = session();
        s.generate(5, 3, 1).unwrap();
        let table = s.table();
        let range = s.range();

        assert!(matches!(
            s.import_counts("{broken"),
            Err(SessionError::Parse(_))
        ));
        assert!(matches!(
            s.import_counts(r#"{"x1": 2}"#),
            Err(SessionError::Parse(_))
        ));
        assert!(matches!(
            s.import_full(r#"{"appearance_counts": {}, "N": 4, "k": 2}"#),
            Err(SessionError::Schema("start"))
        ));

        assert_eq!(s.table(), table);
        assert_eq!(s.range(), range);
    }
}
