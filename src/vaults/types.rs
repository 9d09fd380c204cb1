//! Yearn V3 Contract Addresses, ABIs and Selection Rules
//!
//! Registry, APR oracle and Multicall3 share one address across every
//! supported chain.

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

// ============================================
// YEARN CORE CONTRACTS
// ============================================

/// V3 registries, in attribution order (first one to list a vault owns it)
pub const REGISTRIES: &[Address] = &[
    address!("d40ecF29e001c76Dcc4cC0D9cd50520CE845B038"),
    address!("ff31A1B020c868F6eA3f61Eb953344920EeCA3af"),
];

/// APR oracle (per-strategy annualized yield, 1e18 = 100%)
pub const APR_ORACLE: Address = address!("1981AD9F44F2EA9aDd2dC4AD7D075c102C70aF92");

// ============================================
// SELECTION RULES
// ============================================

/// Registry `vaultType` tag for multi-strategy allocator vaults
pub const MULTI_STRATEGY_TYPE: u64 = 1;

/// Vaults never reported, whatever their type or name
pub const EXCLUDED_VAULTS: &[Address] = &[address!("252b965400862d94BDa35FeCF7Ee0f204a53Cc36")];

/// Compounder wrappers double-count the yield of the vault they wrap
pub const EXCLUDED_NAME_PATTERN: &str = "Liquid Locker Compounder";

/// A vault name must contain one of these to be part of the tracked family
pub const REQUIRED_NAME_MARKERS: &[&str] = &["yVault", "BOLD", "USDaf"];

/// Vaults shown per bucket
pub const TOP_N: usize = 5;

/// Public vault page, `{base}/{chain_id}/{address}`
pub const VAULT_URL_BASE: &str = "https://yearn.fi/v3";

// ============================================
// SOLIDITY INTERFACES
// ============================================

sol! {
    /// Yearn V3 registry
    interface IRegistry {
        function getAllEndorsedVaults() external view returns (address[][] memory);

        // Public mapping getter, struct members come back flattened
        function vaultInfo(address vault) external view returns (
            address asset,
            uint96 releaseVersion,
            uint64 vaultType,
            uint128 deploymentTimestamp,
            uint64 index,
            string memory tag
        );
    }

    /// Yearn V3 vault (ERC-4626)
    interface IVault {
        function name() external view returns (string memory);
        function asset() external view returns (address);
        function totalAssets() external view returns (uint256);
        function decimals() external view returns (uint8);
        function pricePerShare() external view returns (uint256);
    }

    /// Yearn APR oracle
    interface IAprOracle {
        function getStrategyApr(address strategy, int256 debtChange) external view returns (uint256);
    }
}

pub fn is_excluded(vault: &Address) -> bool {
    EXCLUDED_VAULTS.contains(vault)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_vault() {
        let flagged = address!("252b965400862d94bda35fecf7ee0f204a53cc36");
        assert!(is_excluded(&flagged));
        assert!(!is_excluded(&Address::ZERO));
    }

    #[test]
    fn test_constants() {
        assert_eq!(REGISTRIES.len(), 2);
        assert_eq!(TOP_N, 5);
        assert!(REQUIRED_NAME_MARKERS.contains(&"yVault"));
    }
}
