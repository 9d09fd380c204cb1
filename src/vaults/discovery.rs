//! Per-chain vault discovery
//!
//! Three Multicall3 round trips per chain:
//! 1. `getAllEndorsedVaults()` on every registry
//! 2. `vaultInfo(vault)` on the owning registry, keep multi-strategy vaults
//! 3. vault fields plus the oracle APR
//!
//! A failed slot only drops the vault (or registry) it belongs to. A failed
//! round trip fails the chain, which the caller then skips.

use alloy_primitives::{Address, I256, U256};
use eyre::Result;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::katana::AprFeed;
use super::ranking::{oracle_apr_pct, passes_name_rules, scale_units, usd_value, Vault};
use super::types::{
    is_excluded, IAprOracle, IRegistry, IVault, APR_ORACLE, MULTI_STRATEGY_TYPE, REGISTRIES,
};
use crate::config::{AprSource, ChainConfig};
use crate::multicall::{BatchResults, CallBatch, ChainReader, Slot, SlotError};
use crate::price_oracle::SpotPrices;

/// Endorsed vault and the registry that listed it first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndorsedVault {
    pub address: Address,
    pub registry: Address,
}

/// Decoded per-vault fields from the details batch
#[derive(Debug, Clone, PartialEq)]
pub struct VaultReading {
    pub address: Address,
    pub name: String,
    pub asset: Address,
    pub total_assets: U256,
    pub decimals: u8,
    /// Oracle APR (1e18 = 100%); `None` when not read or the slot failed
    pub apr_raw: Option<U256>,
}

struct DetailSlots {
    address: Address,
    name: Slot<IVault::nameCall>,
    asset: Slot<IVault::assetCall>,
    total_assets: Slot<IVault::totalAssetsCall>,
    decimals: Slot<IVault::decimalsCall>,
    apr: Option<Slot<IAprOracle::getStrategyAprCall>>,
}

impl DetailSlots {
    /// The four required fields; any failed slot drops the vault
    fn required(&self, results: &BatchResults) -> Result<(String, Address, U256, u8), SlotError> {
        Ok((
            results.get(self.name)?,
            results.get(self.asset)?,
            results.get(self.total_assets)?,
            results.get(self.decimals)?,
        ))
    }
}

/// Flatten and dedupe every registry's endorsed list, first registry wins
pub async fn endorsed_vaults<R: ChainReader>(reader: &R, chain: &str) -> Result<Vec<EndorsedVault>> {
    let mut batch = CallBatch::new();
    let slots: Vec<_> = REGISTRIES
        .iter()
        .map(|registry| (*registry, batch.add(*registry, IRegistry::getAllEndorsedVaultsCall {})))
        .collect();

    let results = reader.execute(batch).await?;

    let mut seen = HashSet::new();
    let mut vaults = Vec::new();
    for (registry, slot) in slots {
        let lists = match results.get(slot) {
            Ok(lists) => lists,
            Err(e) => {
                warn!("[{}] registry {} skipped: {}", chain, registry, e);
                continue;
            }
        };
        for address in lists.into_iter().flatten() {
            if seen.insert(address) {
                vaults.push(EndorsedVault { address, registry });
            }
        }
    }

    Ok(vaults)
}

/// Keep multi-strategy vaults that are not explicitly excluded
pub async fn multi_strategy_vaults<R: ChainReader>(
    reader: &R,
    chain: &str,
    endorsed: &[EndorsedVault],
) -> Result<Vec<Address>> {
    let candidates: Vec<&EndorsedVault> = endorsed.iter().filter(|v| !is_excluded(&v.address)).collect();

    let mut batch = CallBatch::new();
    let slots: Vec<_> = candidates
        .iter()
        .map(|v| {
            let slot = batch.add(v.registry, IRegistry::vaultInfoCall { vault: v.address });
            (v.address, slot)
        })
        .collect();

    let results = reader.execute(batch).await?;

    let mut kept = Vec::new();
    for (address, slot) in slots {
        match results.get(slot) {
            Ok(info) if info.vaultType == MULTI_STRATEGY_TYPE => kept.push(address),
            Ok(_) => {}
            Err(e) => debug!("[{}] vaultInfo({}) {}", chain, address, e),
        }
    }

    Ok(kept)
}

/// Read name, asset, totalAssets, decimals and (oracle chains only) APR
pub async fn read_vault_details<R: ChainReader>(
    reader: &R,
    chain: &str,
    vaults: &[Address],
    apr_source: AprSource,
) -> Result<Vec<VaultReading>> {
    let mut batch = CallBatch::new();
    let slots: Vec<DetailSlots> = vaults
        .iter()
        .map(|&address| DetailSlots {
            address,
            name: batch.add(address, IVault::nameCall {}),
            asset: batch.add(address, IVault::assetCall {}),
            total_assets: batch.add(address, IVault::totalAssetsCall {}),
            decimals: batch.add(address, IVault::decimalsCall {}),
            apr: (apr_source == AprSource::Oracle).then(|| {
                batch.add(
                    APR_ORACLE,
                    IAprOracle::getStrategyAprCall {
                        strategy: address,
                        debtChange: I256::ZERO,
                    },
                )
            }),
        })
        .collect();

    let results = reader.execute(batch).await?;

    let mut readings = Vec::with_capacity(slots.len());
    for s in slots {
        let (name, asset, total_assets, decimals) = match s.required(&results) {
            Ok(fields) => fields,
            Err(e) => {
                debug!("[{}] vault {} skipped: {}", chain, s.address, e);
                continue;
            }
        };

        let apr_raw = match s.apr.map(|slot| results.get(slot)) {
            Some(Ok(raw)) => Some(raw),
            Some(Err(e)) => {
                debug!("[{}] APR oracle for {}: {}", chain, s.address, e);
                None
            }
            None => None,
        };

        readings.push(VaultReading {
            address: s.address,
            name,
            asset,
            total_assets,
            decimals,
            apr_raw,
        });
    }

    Ok(readings)
}

/// Apply name rules, APR source and USD valuation to one reading
pub fn build_vault(
    chain: &ChainConfig,
    reading: VaultReading,
    prices: &SpotPrices,
    katana: &AprFeed,
) -> Option<Vault> {
    if !passes_name_rules(&reading.name) {
        return None;
    }

    let apr_pct = match chain.apr_source {
        AprSource::Oracle => reading.apr_raw.map(oracle_apr_pct).unwrap_or(0.0),
        AprSource::KatanaApi => katana.apr_for(&reading.address),
    };

    let amount = scale_units(reading.total_assets, reading.decimals);

    Some(Vault {
        name: reading.name,
        chain: chain.name.clone(),
        chain_id: chain.chain_id,
        address: reading.address,
        asset: reading.asset,
        apr_pct,
        tvl_usd: usd_value(amount, &reading.asset, prices),
    })
}

/// Full pipeline for one chain, vaults in discovery order
pub async fn discover_chain<R: ChainReader>(
    reader: &R,
    chain: &ChainConfig,
    prices: &SpotPrices,
    katana: &AprFeed,
) -> Result<Vec<Vault>> {
    let endorsed = endorsed_vaults(reader, &chain.name).await?;
    if endorsed.is_empty() {
        info!("[{}] no endorsed vaults", chain.name);
        return Ok(Vec::new());
    }

    let multi = multi_strategy_vaults(reader, &chain.name, &endorsed).await?;
    if multi.is_empty() {
        info!("[{}] no multi-strategy vaults among {}", chain.name, endorsed.len());
        return Ok(Vec::new());
    }

    let readings = read_vault_details(reader, &chain.name, &multi, chain.apr_source).await?;
    let vaults: Vec<Vault> = readings
        .into_iter()
        .filter_map(|r| build_vault(chain, r, prices, katana))
        .collect();

    info!(
        "🏦 [{}] {} endorsed, {} multi-strategy, {} tracked",
        chain.name,
        endorsed.len(),
        multi.len(),
        vaults.len()
    );

    Ok(vaults)
}

/// Run every chain concurrently; results merge in chain order.
///
/// A chain that errors contributes no vaults.
pub async fn discover_all<R: ChainReader>(
    chains: &[(ChainConfig, R)],
    prices: &SpotPrices,
    katana: &AprFeed,
) -> Vec<Vault> {
    let runs = chains
        .iter()
        .map(|(chain, reader)| discover_chain(reader, chain, prices, katana));

    let mut all = Vec::new();
    for ((chain, _), outcome) in chains.iter().zip(join_all(runs).await) {
        match outcome {
            Ok(vaults) => all.extend(vaults),
            Err(e) => warn!("[{}] chain skipped: {}", chain.name, e),
        }
    }
    all
}
