//! Staker reward accounting
//!
//! A reward distributor pays stakers in shares of a vault. Each run reads
//! last epoch's payout and the vault's live `pricePerShare` to value it in
//! the vault's underlying (crvUSD).

use alloy_primitives::{address, Address, U256};
use alloy_sol_types::sol;
use eyre::{eyre, Result};
use tracing::info;

use crate::history::{week_over_week, RewardRecord, WeekStamp, SCHEMA_VERSION};
use crate::multicall::{CallBatch, ChainReader};
use crate::vaults::ranking::scale_units;
use crate::vaults::types::IVault;

/// yCRV reward distributor (mainnet)
pub const YCRV_DISTRIBUTOR: Address = address!("B226c52EB411326CdB54824a88aBaFDAAfF16D3d");

/// yvcrvUSD-2, the vault yCRV rewards are paid in (mainnet)
pub const YCRV_REWARD_VAULT: Address = address!("BF319dDC2Edc1Eb6FDf9910E39b37Be221C8805F");

/// Both reward amounts and price per share use 18 decimals
const SHARE_DECIMALS: u8 = 18;

sol! {
    interface IRewardDistributor {
        function getWeek() external view returns (uint256);
        function weeklyRewardAmount(uint256 week) external view returns (uint256);
    }
}

/// A distributor/vault pair and the history series it writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardProgram {
    pub label: String,
    pub series: String,
    pub distributor: Address,
    pub vault: Address,
}

impl RewardProgram {
    pub fn ycrv() -> Self {
        Self {
            label: "yCRV".to_string(),
            series: "ycrv".to_string(),
            distributor: YCRV_DISTRIBUTOR,
            vault: YCRV_REWARD_VAULT,
        }
    }

    pub fn yyb(distributor: Address, vault: Address) -> Self {
        Self {
            label: "yYB".to_string(),
            series: "yyb".to_string(),
            distributor,
            vault,
        }
    }
}

/// On-chain reads for one epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardReading {
    /// The completed epoch that was read
    pub distributor_week: u64,
    pub reward_shares: U256,
    pub price_per_share: U256,
}

/// Read last epoch's payout and the vault's share price
pub async fn read_rewards<R: ChainReader>(reader: &R, program: &RewardProgram) -> Result<RewardReading> {
    let current = reader
        .read(program.distributor, IRewardDistributor::getWeekCall {})
        .await?;
    let previous = current
        .checked_sub(U256::from(1))
        .ok_or_else(|| eyre!("{} distributor is still in its first week", program.label))?;

    let mut batch = CallBatch::new();
    let amount = batch.add(
        program.distributor,
        IRewardDistributor::weeklyRewardAmountCall { week: previous },
    );
    let pps = batch.add(program.vault, IVault::pricePerShareCall {});
    let results = reader
        .execute(batch)
        .await
        .map_err(|e| eyre!("{} reward reads failed: {}", program.label, e))?;

    let reward_shares = results
        .get(amount)
        .map_err(|e| eyre!("{} weeklyRewardAmount({}): {}", program.label, previous, e))?;
    let price_per_share = results
        .get(pps)
        .map_err(|e| eyre!("{} pricePerShare: {}", program.label, e))?;

    let distributor_week = u64::try_from(previous)
        .map_err(|_| eyre!("{} distributor week {} out of range", program.label, previous))?;

    Ok(RewardReading {
        distributor_week,
        reward_shares,
        price_per_share,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewardSnapshot {
    pub label: String,
    pub series: String,
    pub stamp: WeekStamp,
    pub distributor_week: u64,
    pub rewards_vault_tokens: f64,
    pub rewards_crvusd: f64,
    pub price_per_share: f64,
    pub prev_rewards_crvusd: Option<f64>,
    pub wow_pct: Option<f64>,
}

impl RewardSnapshot {
    pub fn compute(
        program: &RewardProgram,
        stamp: WeekStamp,
        reading: RewardReading,
        prev: Option<&RewardRecord>,
    ) -> Self {
        let rewards_vault_tokens = scale_units(reading.reward_shares, SHARE_DECIMALS);
        let price_per_share = scale_units(reading.price_per_share, SHARE_DECIMALS);
        let rewards_crvusd = rewards_vault_tokens * price_per_share;

        let prev_rewards_crvusd = prev.map(|p| p.rewards_crvusd).filter(|v| *v > 0.0);

        Self {
            label: program.label.clone(),
            series: program.series.clone(),
            stamp,
            distributor_week: reading.distributor_week,
            rewards_vault_tokens,
            rewards_crvusd,
            price_per_share,
            prev_rewards_crvusd,
            wow_pct: week_over_week(rewards_crvusd, prev_rewards_crvusd),
        }
    }

    pub fn to_record(&self) -> RewardRecord {
        RewardRecord {
            schema: SCHEMA_VERSION,
            week: self.stamp.week,
            year: self.stamp.year,
            distributor_week: self.distributor_week,
            rewards_vault_tokens: self.rewards_vault_tokens,
            rewards_crvusd: self.rewards_crvusd,
            price_per_share: self.price_per_share,
        }
    }

    pub fn log(&self) {
        info!(
            "💰 {}: {:.2} crvUSD for distributor week {} (pps {:.4})",
            self.label, self.rewards_crvusd, self.distributor_week, self.price_per_share
        );
    }
}
