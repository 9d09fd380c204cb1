//! Vault filtering, USD valuation and ranking
//!
//! Pure functions over decoded reads; nothing here touches the network.

use alloy_primitives::{Address, U256};

use super::types::{EXCLUDED_NAME_PATTERN, REQUIRED_NAME_MARKERS, VAULT_URL_BASE};
use crate::price_oracle::SpotPrices;
use crate::tokens::{classify, is_crypto_asset};

/// Which list a vault competes in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Stable,
    Crypto,
}

/// Snapshot of one vault for this run, never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Vault {
    pub name: String,
    pub chain: String,
    pub chain_id: u64,
    pub address: Address,
    /// Underlying asset, decides the bucket
    pub asset: Address,
    pub apr_pct: f64,
    pub tvl_usd: f64,
}

impl Vault {
    pub fn bucket(&self) -> Bucket {
        if is_crypto_asset(&self.asset) {
            Bucket::Crypto
        } else {
            Bucket::Stable
        }
    }

    pub fn url(&self) -> String {
        format!("{}/{}/{}", VAULT_URL_BASE, self.chain_id, self.address)
    }
}

/// Best vaults per bucket, highest APR first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopVaults {
    pub stable: Vec<Vault>,
    pub crypto: Vec<Vault>,
}

impl TopVaults {
    pub fn is_empty(&self) -> bool {
        self.stable.is_empty() && self.crypto.is_empty()
    }
}

/// Name-based inclusion/exclusion
pub fn passes_name_rules(name: &str) -> bool {
    if name.contains(EXCLUDED_NAME_PATTERN) {
        return false;
    }
    REQUIRED_NAME_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Lossy U256 -> f64, limb by limb so large values never overflow
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, &limb| acc * 18_446_744_073_709_551_616.0 + limb as f64)
}

/// Raw token amount to human units
pub fn scale_units(raw: U256, decimals: u8) -> f64 {
    u256_to_f64(raw) / 10_f64.powi(decimals as i32)
}

/// APR oracle reading (1e18 = 100%) to a percentage
pub fn oracle_apr_pct(raw: U256) -> f64 {
    u256_to_f64(raw) / 1e18 * 100.0
}

/// USD value of `amount` units of `asset`
pub fn usd_value(amount: f64, asset: &Address, prices: &SpotPrices) -> f64 {
    amount * prices.price_of(classify(asset))
}

/// Split into buckets and keep the `limit` best of each.
///
/// The sort is stable, so equal APRs keep discovery order.
pub fn rank(vaults: Vec<Vault>, limit: usize) -> TopVaults {
    let (mut crypto, mut stable): (Vec<Vault>, Vec<Vault>) = vaults
        .into_iter()
        .partition(|v| v.bucket() == Bucket::Crypto);

    stable.sort_by(|a, b| b.apr_pct.total_cmp(&a.apr_pct));
    crypto.sort_by(|a, b| b.apr_pct.total_cmp(&a.apr_pct));
    stable.truncate(limit);
    crypto.truncate(limit);

    TopVaults { stable, crypto }
}
