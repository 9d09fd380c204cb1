//! Yearn V3 vaults across chains
//!
//! Discovery reads registries and vault fields through Multicall3, ranking
//! turns the readings into the top stable/crypto lists.

pub mod discovery;
pub mod katana;
pub mod ranking;
pub mod types;

pub use katana::{fetch_katana_aprs, AprFeed};
pub use ranking::{rank, TopVaults, Vault};

use tracing::{info, warn};

use crate::config::Config;
use crate::multicall::RpcReader;
use crate::price_oracle::SpotPrices;
use types::TOP_N;

/// Discover vaults on every chain with an RPC URL and rank them
pub async fn collect_top_vaults(config: &Config, prices: &SpotPrices, katana: &AprFeed) -> TopVaults {
    let chains: Vec<_> = config
        .chains
        .iter()
        .filter_map(|chain| match &chain.rpc_url {
            Some(url) => Some((chain.clone(), RpcReader::new(url.clone(), config.rpc_timeout()))),
            None => {
                warn!("[{}] no RPC URL configured, skipping", chain.name);
                None
            }
        })
        .collect();

    let vaults = discovery::discover_all(&chains, prices, katana).await;
    let top = rank(vaults, TOP_N);

    info!(
        "🏆 Top vaults: {} stable, {} crypto",
        top.stable.len(),
        top.crypto.len()
    );

    top
}
