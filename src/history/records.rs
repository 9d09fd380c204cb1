//! Typed cache records
//!
//! Files written by older versions carry no `schema` field; they load as
//! schema 1.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::week::WeekStamp;

pub const SCHEMA_VERSION: u32 = 1;

fn default_schema() -> u32 {
    SCHEMA_VERSION
}

/// A record that can live in a per-series history file
pub trait CacheRecord: Serialize + DeserializeOwned {
    fn stamp(&self) -> WeekStamp;
}

/// Series `tvl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvlRecord {
    #[serde(default = "default_schema")]
    pub schema: u32,
    pub week: u32,
    pub year: i32,
    pub tvl_usd: f64,
    pub tvl_eth: f64,
    #[serde(default)]
    pub defi_tvl_usd: Option<f64>,
    #[serde(default)]
    pub ya_tvl_usd: Option<f64>,
}

impl CacheRecord for TvlRecord {
    fn stamp(&self) -> WeekStamp {
        WeekStamp::new(self.week, self.year)
    }
}

/// Series `ycrv` / `yyb`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardRecord {
    #[serde(default = "default_schema")]
    pub schema: u32,
    pub week: u32,
    pub year: i32,
    /// Distributor epoch the amount was paid for
    pub distributor_week: u64,
    pub rewards_vault_tokens: f64,
    pub rewards_crvusd: f64,
    pub price_per_share: f64,
}

impl CacheRecord for RewardRecord {
    fn stamp(&self) -> WeekStamp {
        WeekStamp::new(self.week, self.year)
    }
}
