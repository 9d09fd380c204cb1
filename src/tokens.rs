//! Token definitions for vault valuation
//!
//! Vaults are priced by their underlying asset:
//! - Wrapped ETH on every tracked chain
//! - Wrapped BTC (plus cbBTC)
//! - SKY and yYB governance tokens
//!
//! Anything else is a USD stablecoin and is valued 1:1.

use alloy_primitives::{address, Address};
use lazy_static::lazy_static;
use std::collections::HashSet;

/// Pricing class of a vault's underlying asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Eth,
    Btc,
    Sky,
    Yyb,
    /// Stablecoins, assumed $1
    Stable,
}

impl AssetClass {
    /// Crypto assets go in the "crypto" vault bucket, everything else is "stable"
    pub fn is_crypto(self) -> bool {
        !matches!(self, AssetClass::Stable)
    }
}

// ============================================
// WRAPPED NATIVE (ETH)
// ============================================

pub const WETH_TOKENS: &[(Address, &str)] = &[
    (address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), "mainnet"),
    (address!("4200000000000000000000000000000000000006"), "base"),
    (address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"), "arbitrum"),
    (address!("EE7D8BCFb72bC1880D0Cf19822eB0A2e6577aB62"), "katana"),
];

// ============================================
// WRAPPED BTC
// ============================================

pub const WBTC_TOKENS: &[(Address, &str)] = &[
    (address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"), "mainnet"),
    (address!("2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f"), "arbitrum"),
    (address!("0555E30da8f98308EdB960aa94C0Db47230d2B9c"), "base"),
    (address!("0913DA6Da4b42f538B445599b46Bb4622342Cf52"), "katana"),
    // cbBTC (same address on mainnet and base)
    (address!("cbB7C0000aB88B473b1f5aFd9ef808440eed33Bf"), "mainnet/base"),
];

// ============================================
// GOVERNANCE / UTILITY TOKENS
// ============================================

/// SKY - Sky Protocol governance token
pub const SKY_TOKEN: Address = address!("56072C95FAA701256059aa122697B133aDEd9279");

/// yYB - Yearn yield-bearing YB
pub const YYB_TOKEN: Address = address!("22222222aEA0076fCA927a3f44dc0B4FdF9479D6");

lazy_static! {
    static ref WETH_SET: HashSet<Address> = WETH_TOKENS.iter().map(|(a, _)| *a).collect();
    static ref WBTC_SET: HashSet<Address> = WBTC_TOKENS.iter().map(|(a, _)| *a).collect();
}

/// Classify an underlying asset for pricing and bucketing
pub fn classify(asset: &Address) -> AssetClass {
    if WETH_SET.contains(asset) {
        AssetClass::Eth
    } else if WBTC_SET.contains(asset) {
        AssetClass::Btc
    } else if *asset == SKY_TOKEN {
        AssetClass::Sky
    } else if *asset == YYB_TOKEN {
        AssetClass::Yyb
    } else {
        AssetClass::Stable
    }
}

/// Whether the asset belongs to the crypto token set
pub fn is_crypto_asset(asset: &Address) -> bool {
    classify(asset).is_crypto()
}
