//! Katana APR API
//!
//! Katana vaults have no APR oracle deployment; their yield comes from an
//! HTTP service that breaks APR down into reward components. The feed is
//! optional: any failure leaves it unavailable and Katana vaults show 0%.

use alloy_primitives::Address;
use eyre::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const DEFAULT_KATANA_APR_API: &str = "https://katana-apr-service.vercel.app/api/vaults";

#[derive(Debug, Default, Deserialize)]
struct KatanaVault {
    #[serde(default)]
    apr: Option<KatanaApr>,
}

#[derive(Debug, Default, Deserialize)]
struct KatanaApr {
    #[serde(default)]
    extra: Option<KatanaAprExtra>,
}

#[derive(Debug, Default, Deserialize)]
struct KatanaAprExtra {
    #[serde(rename = "katanaAppRewardsAPR", default)]
    app_rewards: Option<f64>,
    #[serde(rename = "FixedRateKatanaRewards", default)]
    fixed_rate_rewards: Option<f64>,
    #[serde(rename = "katanaNativeYield", default)]
    native_yield: Option<f64>,
}

impl KatanaAprExtra {
    /// Sum of the reward components, as a percentage
    fn total_pct(&self) -> f64 {
        let parts = [self.app_rewards, self.fixed_rate_rewards, self.native_yield];
        parts.iter().map(|p| p.unwrap_or(0.0)).sum::<f64>() * 100.0
    }
}

/// APR per vault from an off-chain source, or nothing at all
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AprFeed {
    Available(HashMap<Address, f64>),
    #[default]
    Unavailable,
}

impl AprFeed {
    /// APR percentage for a vault; vaults the feed doesn't know about get 0%
    pub fn apr_for(&self, vault: &Address) -> f64 {
        match self {
            AprFeed::Available(aprs) => aprs.get(vault).copied().unwrap_or(0.0),
            AprFeed::Unavailable => 0.0,
        }
    }
}

/// Build the feed from the raw API body
fn parse_feed(body: HashMap<String, Value>) -> AprFeed {
    let mut aprs = HashMap::new();

    for (key, value) in body {
        let Ok(address) = Address::from_str(key.trim()) else {
            debug!("Katana APR: skipping non-address key {}", key);
            continue;
        };
        let vault: KatanaVault = match serde_json::from_value(value) {
            Ok(v) => v,
            Err(e) => {
                debug!("Katana APR: skipping {}: {}", address, e);
                continue;
            }
        };
        let total = vault
            .apr
            .and_then(|apr| apr.extra)
            .map(|extra| extra.total_pct())
            .unwrap_or(0.0);
        aprs.insert(address, total);
    }

    AprFeed::Available(aprs)
}

async fn fetch_body(http_client: &Client, url: &str) -> Result<HashMap<String, Value>> {
    let body = http_client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(body)
}

/// Fetch Katana APRs; never fails, degrades to [`AprFeed::Unavailable`]
pub async fn fetch_katana_aprs(http_client: &Client, url: &str) -> AprFeed {
    match fetch_body(http_client, url).await {
        Ok(body) => {
            let feed = parse_feed(body);
            if let AprFeed::Available(ref aprs) = feed {
                info!("🔶 Katana APR feed: {} vaults", aprs.len());
            }
            feed
        }
        Err(e) => {
            warn!("Katana APR API unavailable, Katana vaults will show 0% APR: {}", e);
            AprFeed::Unavailable
        }
    }
}
