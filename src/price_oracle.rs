//! Spot Price Oracle - DefiLlama coins API
//!
//! Fetches current USD prices for every non-stable asset the vault valuation
//! needs (ETH, BTC, SKY, yYB) in a single request. Prices are critical data:
//! there is no fallback source, a failure aborts the run.
//!
//! API: https://coins.llama.fi/prices/current/{coin},{coin},...

use eyre::{eyre, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::tokens::AssetClass;

// ============================================
// CONSTANTS
// ============================================

/// DefiLlama coins API base URL
pub const DEFAULT_PRICE_API_URL: &str = "https://coins.llama.fi";

pub const ETH_COIN: &str = "coingecko:ethereum";
pub const BTC_COIN: &str = "coingecko:bitcoin";
pub const SKY_COIN: &str = "ethereum:0x56072C95FAA701256059aa122697B133aDEd9279";
pub const YYB_COIN: &str = "ethereum:0x22222222aEA0076fCA927a3f44dc0B4FdF9479D6";

// ============================================
// API RESPONSE TYPES
// ============================================

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    coins: HashMap<String, CoinPrice>,
}

#[derive(Debug, Deserialize)]
struct CoinPrice {
    price: f64,
}

// ============================================
// SPOT PRICES
// ============================================

/// USD spot prices fetched once per run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotPrices {
    pub eth: f64,
    pub btc: f64,
    pub sky: f64,
    pub yyb: f64,
}

impl SpotPrices {
    /// USD price of one unit of an asset class (stables are $1)
    pub fn price_of(&self, class: AssetClass) -> f64 {
        match class {
            AssetClass::Eth => self.eth,
            AssetClass::Btc => self.btc,
            AssetClass::Sky => self.sky,
            AssetClass::Yyb => self.yyb,
            AssetClass::Stable => 1.0,
        }
    }

    fn from_response(response: &PriceResponse) -> Result<Self> {
        let price = |coin: &str| -> Result<f64> {
            let price = response
                .coins
                .get(coin)
                .map(|c| c.price)
                .ok_or_else(|| eyre!("Price API returned no price for {}", coin))?;
            if !price.is_finite() || price <= 0.0 {
                return Err(eyre!("Price API returned invalid price {} for {}", price, coin));
            }
            Ok(price)
        };

        Ok(Self {
            eth: price(ETH_COIN)?,
            btc: price(BTC_COIN)?,
            sky: price(SKY_COIN)?,
            yyb: price(YYB_COIN)?,
        })
    }
}

/// Request URL for a set of coins
pub fn prices_url(base_url: &str, coins: &[&str]) -> String {
    format!(
        "{}/prices/current/{}",
        base_url.trim_end_matches('/'),
        coins.join(",")
    )
}

// ============================================
// PRICE ORACLE
// ============================================

pub struct PriceOracle {
    http_client: Client,
    base_url: String,
}

impl PriceOracle {
    pub fn new(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Fetch ETH, BTC, SKY and yYB prices in one request
    pub async fn fetch_spot_prices(&self) -> Result<SpotPrices> {
        let url = prices_url(&self.base_url, &[ETH_COIN, BTC_COIN, SKY_COIN, YYB_COIN]);
        debug!("Fetching spot prices: {}", url);

        let response: PriceResponse = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let prices = SpotPrices::from_response(&response)?;
        info!(
            "💲 Prices: ETH ${:.2}, BTC ${:.2}, SKY ${:.4}, yYB ${:.4}",
            prices.eth, prices.btc, prices.sky, prices.yyb
        );
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "coins": {
            "coingecko:ethereum": {"price": 3012.5, "symbol": "ETH", "timestamp": 1760000000, "confidence": 0.99},
            "coingecko:bitcoin": {"price": 101000.0, "symbol": "BTC", "timestamp": 1760000000, "confidence": 0.99},
            "ethereum:0x56072C95FAA701256059aa122697B133aDEd9279": {"decimals": 18, "price": 0.071, "symbol": "SKY", "timestamp": 1760000000, "confidence": 0.99},
            "ethereum:0x22222222aEA0076fCA927a3f44dc0B4FdF9479D6": {"decimals": 18, "price": 0.42, "symbol": "yYB", "timestamp": 1760000000, "confidence": 0.99}
        }
    }"#;

    #[test]
    fn test_parse_prices() {
        let response: PriceResponse = serde_json::from_str(SAMPLE).unwrap();
        let prices = SpotPrices::from_response(&response).unwrap();
        assert_eq!(prices.eth, 3012.5);
        assert_eq!(prices.btc, 101000.0);
        assert_eq!(prices.sky, 0.071);
        assert_eq!(prices.yyb, 0.42);
    }

    #[test]
    fn test_missing_coin_is_error() {
        let response: PriceResponse =
            serde_json::from_str(r#"{"coins": {"coingecko:ethereum": {"price": 3000.0}}}"#).unwrap();
        let err = SpotPrices::from_response(&response).unwrap_err();
        assert!(err.to_string().contains("coingecko:bitcoin"));
    }

    #[test]
    fn test_zero_price_is_error() {
        let body = SAMPLE.replace("3012.5", "0.0");
        let response: PriceResponse = serde_json::from_str(&body).unwrap();
        assert!(SpotPrices::from_response(&response).is_err());
    }

    #[test]
    fn test_price_of() {
        let prices = SpotPrices { eth: 3000.0, btc: 100000.0, sky: 0.07, yyb: 0.5 };
        assert_eq!(prices.price_of(AssetClass::Eth), 3000.0);
        assert_eq!(prices.price_of(AssetClass::Stable), 1.0);
    }

    #[test]
    fn test_prices_url() {
        assert_eq!(
            prices_url("https://coins.llama.fi/", &[ETH_COIN, BTC_COIN]),
            "https://coins.llama.fi/prices/current/coingecko:ethereum,coingecko:bitcoin"
        );
    }
}
