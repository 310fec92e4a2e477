use crate::config::RangeConfig;
use crate::store::CounterStore;
use rand::seq::SliceRandom;
use rand::Rng;

/// Draw a batch of `range.k` distinct items from the universe, favoring the
/// least-represented ones.
///
/// Items tied at the minimum appearance count form the eligible tier; the
/// tier is shuffled uniformly and drained from the end. When the tier is
/// smaller than `k`, the remainder is sampled uniformly without replacement
/// from the rest of the range regardless of count — strict fairness yields
/// to a full batch.
///
/// Pure with respect to the store: increments are the caller's job, applied
/// only after the full batch is determined.
///
/// Caller must have validated `k <= n`.
pub fn draw_batch<R: Rng>(store: &CounterStore, range: &RangeConfig, rng: &mut R) -> Vec<i64> {
    let full_range: Vec<i64> = range.items().collect();

    let min_count = full_range.iter().map(|&i| store.get(i)).min().unwrap_or(0);
    let mut eligible: Vec<i64> = full_range
        .iter()
        .copied()
        .filter(|&i| store.get(i) == min_count)
        .collect();
    eligible.shuffle(rng);

    let k = range.k as usize;
    let mut batch = Vec::with_capacity(k);
    while batch.len() < k {
        match eligible.pop() {
            Some(item) => batch.push(item),
            None => break,
        }
    }

    // Minimum tier exhausted: top up from the rest of the range, uniformly
    // without replacement.
    if batch.len() < k {
        let remaining: Vec<i64> = full_range
            .iter()
            .copied()
            .filter(|item| !batch.contains(item))
            .collect();
        let need = k - batch.len();
        for idx in rand::seq::index::sample(rng, remaining.len(), need) {
            batch.push(remaining[idx]);
        }
    }

    batch
}
