//! Protocol TVL - DefiLlama TVL API
//!
//! Three figures per run: Yearn's own TVL, total DeFi TVL and the sum over
//! the "Yield Aggregator" category. All three are critical: any failure
//! aborts the run.
//!
//! Endpoints:
//! - `/tvl/yearn` -> plain number
//! - `/v2/historicalChainTvl` -> `[{date, tvl}, ...]`, last entry is current
//! - `/protocols` -> `[{category, tvl, ...}, ...]`

use eyre::{eyre, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::history::{week_over_week, TvlRecord, WeekStamp, SCHEMA_VERSION};

pub const DEFAULT_LLAMA_API_URL: &str = "https://api.llama.fi";

/// History series name
pub const TVL_SERIES: &str = "tvl";

const YIELD_AGGREGATOR_CATEGORY: &str = "Yield Aggregator";

// ============================================
// API RESPONSE TYPES
// ============================================

#[derive(Debug, Deserialize)]
struct ChainTvlPoint {
    tvl: f64,
}

#[derive(Debug, Deserialize)]
struct ProtocolEntry {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tvl: Option<f64>,
}

fn latest_chain_tvl(points: &[ChainTvlPoint]) -> Result<f64> {
    points
        .last()
        .map(|p| p.tvl)
        .ok_or_else(|| eyre!("historicalChainTvl returned no data points"))
}

fn yield_aggregator_tvl(protocols: &[ProtocolEntry]) -> f64 {
    protocols
        .iter()
        .filter(|p| p.category.as_deref() == Some(YIELD_AGGREGATOR_CATEGORY))
        .map(|p| p.tvl.unwrap_or(0.0))
        .sum()
}

// ============================================
// TVL SOURCE
// ============================================

/// Raw figures in USD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TvlInputs {
    pub tvl_usd: f64,
    pub defi_tvl_usd: f64,
    pub ya_tvl_usd: f64,
}

pub struct TvlSource {
    http_client: Client,
    base_url: String,
}

impl TvlSource {
    pub fn new(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let body = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| eyre!("Bad response from {}: {}", url, e))?;
        Ok(body)
    }

    pub async fn fetch_yearn_tvl(&self) -> Result<f64> {
        self.get("/tvl/yearn").await
    }

    pub async fn fetch_defi_tvl(&self) -> Result<f64> {
        let points: Vec<ChainTvlPoint> = self.get("/v2/historicalChainTvl").await?;
        latest_chain_tvl(&points)
    }

    pub async fn fetch_yield_aggregator_tvl(&self) -> Result<f64> {
        let protocols: Vec<ProtocolEntry> = self.get("/protocols").await?;
        Ok(yield_aggregator_tvl(&protocols))
    }

    /// All three figures, requested concurrently
    pub async fn fetch_inputs(&self) -> Result<TvlInputs> {
        let (tvl_usd, defi_tvl_usd, ya_tvl_usd) = tokio::try_join!(
            self.fetch_yearn_tvl(),
            self.fetch_defi_tvl(),
            self.fetch_yield_aggregator_tvl(),
        )?;

        info!(
            "📈 TVL: Yearn ${:.0}, DeFi ${:.0}, Yield Aggregators ${:.0}",
            tvl_usd, defi_tvl_usd, ya_tvl_usd
        );

        Ok(TvlInputs {
            tvl_usd,
            defi_tvl_usd,
            ya_tvl_usd,
        })
    }
}

// ============================================
// SNAPSHOT
// ============================================

/// Previous-week value of a secondary figure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorFigure {
    pub usd: f64,
    /// Converted at this week's ETH price
    pub eth: f64,
    pub wow_pct: Option<f64>,
}

/// Last week's numbers next to this week's
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TvlComparison {
    pub tvl_usd: f64,
    pub tvl_eth: f64,
    pub wow_usd_pct: Option<f64>,
    pub wow_eth_pct: Option<f64>,
    pub defi: Option<PriorFigure>,
    pub ya: Option<PriorFigure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TvlSnapshot {
    pub stamp: WeekStamp,
    pub tvl_usd: f64,
    pub tvl_eth: f64,
    pub defi_tvl_usd: f64,
    pub defi_tvl_eth: f64,
    pub ya_tvl_usd: f64,
    pub ya_tvl_eth: f64,
    /// Yearn as a percentage of total DeFi TVL
    pub yearn_share_defi: Option<f64>,
    /// Yearn as a percentage of the yield-aggregator category
    pub yearn_share_ya: Option<f64>,
    pub previous: Option<TvlComparison>,
}

fn share_pct(part: f64, whole: f64) -> Option<f64> {
    (whole > 0.0).then(|| part / whole * 100.0)
}

impl TvlSnapshot {
    pub fn compute(stamp: WeekStamp, inputs: TvlInputs, eth_price: f64, prev: Option<&TvlRecord>) -> Self {
        let to_eth = |usd: f64| usd / eth_price;
        let tvl_eth = to_eth(inputs.tvl_usd);

        let prior = |usd: Option<f64>, current: f64| {
            usd.map(|usd| PriorFigure {
                usd,
                eth: to_eth(usd),
                wow_pct: week_over_week(current, Some(usd)),
            })
        };

        let previous = prev.map(|p| TvlComparison {
            tvl_usd: p.tvl_usd,
            tvl_eth: p.tvl_eth,
            wow_usd_pct: week_over_week(inputs.tvl_usd, Some(p.tvl_usd)),
            wow_eth_pct: week_over_week(tvl_eth, Some(p.tvl_eth)),
            defi: prior(p.defi_tvl_usd, inputs.defi_tvl_usd),
            ya: prior(p.ya_tvl_usd, inputs.ya_tvl_usd),
        });

        Self {
            stamp,
            tvl_usd: inputs.tvl_usd,
            tvl_eth,
            defi_tvl_usd: inputs.defi_tvl_usd,
            defi_tvl_eth: to_eth(inputs.defi_tvl_usd),
            ya_tvl_usd: inputs.ya_tvl_usd,
            ya_tvl_eth: to_eth(inputs.ya_tvl_usd),
            yearn_share_defi: share_pct(inputs.tvl_usd, inputs.defi_tvl_usd),
            yearn_share_ya: share_pct(inputs.tvl_usd, inputs.ya_tvl_usd),
            previous,
        }
    }

    pub fn to_record(&self) -> TvlRecord {
        TvlRecord {
            schema: SCHEMA_VERSION,
            week: self.stamp.week,
            year: self.stamp.year,
            tvl_usd: self.tvl_usd,
            tvl_eth: self.tvl_eth,
            defi_tvl_usd: Some(self.defi_tvl_usd),
            ya_tvl_usd: Some(self.ya_tvl_usd),
        }
    }
}
