use crate::config::RangeConfig;
use crate::error::SessionError;
use crate::store::CounterStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Wire form of a full-progress snapshot:
/// `{"appearance_counts": {...}, "N": n, "k": k, "start": start}`.
#[derive(Serialize, Deserialize)]
struct FullProgress {
    appearance_counts: HashMap<String, u64>,
    #[serde(rename = "N")]
    n: u32,
    k: u32,
    start: i64,
}

const FULL_FIELDS: [&str; 4] = ["appearance_counts", "N", "k", "start"];

/// Counts-only snapshot: a JSON object keyed by decimal-string items.
pub fn encode_counts(store: &CounterStore) -> String {
    let map: BTreeMap<String, u64> = store
        .counts()
        .iter()
        .map(|(&item, &count)| (item.to_string(), count))
        .collect();
    serde_json::to_string_pretty(&map).expect("string-keyed map serializes")
}

/// Parse a counts-only snapshot back into an item-keyed map.
///
/// The whole replacement map is built before returning, so a failure never
/// leaves a partial result behind.
pub fn decode_counts(text: &str) -> Result<HashMap<i64, u64>, SessionError> {
    let raw: HashMap<String, u64> =
        serde_json::from_str(text).map_err(|e| SessionError::Parse(e.to_string()))?;
    parse_item_keys(raw)
}

/// Full snapshot: counts plus the active range config.
pub fn encode_full(store: &CounterStore, range: &RangeConfig) -> String {
    let full = FullProgress {
        appearance_counts: store
            .counts()
            .iter()
            .map(|(&item, &count)| (item.to_string(), count))
            .collect(),
        n: range.n,
        k: range.k,
        start: range.start,
    };
    serde_json::to_string_pretty(&full).expect("full progress serializes")
}

/// Parse a full snapshot. A payload that is valid JSON but lacks one of the
/// required fields is a schema error, not a parse error.
pub fn decode_full(text: &str) -> Result<(HashMap<i64, u64>, RangeConfig), SessionError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| SessionError::Parse(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| SessionError::Parse("expected a JSON object".to_string()))?;
    for field in FULL_FIELDS {
        if !object.contains_key(field) {
            return Err(SessionError::Schema(field));
        }
    }

    let full: FullProgress =
        serde_json::from_value(value).map_err(|e| SessionError::Parse(e.to_string()))?;
    let counts = parse_item_keys(full.appearance_counts)?;
    Ok((counts, RangeConfig::new(full.n, full.k, full.start)))
}

fn parse_item_keys(raw: HashMap<String, u64>) -> Result<HashMap<i64, u64>, SessionError> {
    raw.into_iter()
        .map(|(key, count)| {
            let item = key
                .parse::<i64>()
                .map_err(|_| SessionError::Parse(format!("counts key `{key}` is not an integer")))?;
            Ok((item, count))
        })
        .collect()
}
