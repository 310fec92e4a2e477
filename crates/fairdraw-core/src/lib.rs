//! Fair batch sampling over a fixed integer range.
//!
//! Repeated [`Session::generate`] calls draw batches of distinct items from
//! `[start, start + n)` so that, over time, every item is selected
//! approximately the same number of times. Cumulative per-item appearance
//! counts persist across calls and serialize to JSON for save/load.
//!
//! Modules:
//! - `store`: the appearance-count map and its mutations.
//! - `selector`: the least-used-first draw with randomized tie-breaking.
//! - `session`: the operation boundary owning store + range config.
//! - `codec`: JSON encode/decode for the two snapshot formats.

pub mod codec;
pub mod config;
pub mod error;
pub mod selector;
pub mod session;
pub mod store;

pub use config::RangeConfig;
pub use error::SessionError;
pub use session::{BatchOutcome, DisplayState, FullState, Session};
pub use store::CounterStore;
