//! Week-over-week history
//!
//! Each series (`tvl`, `ycrv`, `yyb`) keeps one record per newsletter week in
//! a local JSON file. Concurrent runs against the same directory are not
//! supported.

pub mod records;
pub mod store;
pub mod week;

pub use records::{RewardRecord, TvlRecord, SCHEMA_VERSION};
pub use store::HistoryStore;
pub use week::{week_over_week, WeekStamp};
