//! Configuration for The Blue Pill
//!
//! Chains, endpoints, paths and timeouts. Loaded from the environment
//! (and `.env`), or from a TOML file with the same structure.
//!
//! A chain without an RPC URL is not an error: it is simply skipped.

use alloy_primitives::Address;
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::price_oracle::DEFAULT_PRICE_API_URL;
use crate::rewards::RewardProgram;
use crate::tvl::DEFAULT_LLAMA_API_URL;
use crate::vaults::katana::DEFAULT_KATANA_APR_API;

// ============================================
// CHAINS
// ============================================

/// Where a chain's vault APRs come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AprSource {
    /// On-chain APR oracle, read in the same multicall as the vault fields
    Oracle,
    /// Katana APR HTTP API
    KatanaApi,
}

/// One supported chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    /// JSON-RPC endpoint; `None` disables the chain for this run
    #[serde(default)]
    pub rpc_url: Option<String>,
    pub chain_id: u64,
    pub apr_source: AprSource,
}

impl ChainConfig {
    pub fn new(name: &str, rpc_url: Option<String>, chain_id: u64, apr_source: AprSource) -> Self {
        Self {
            name: name.to_string(),
            rpc_url,
            chain_id,
            apr_source,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.rpc_url.is_some()
    }
}

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // ========== Paths ==========
    /// Directory holding the `{series}_cache.json` history files
    pub data_dir: PathBuf,

    /// Rendered newsletter
    pub output_file: PathBuf,

    // ========== Network ==========
    /// Timeout for every HTTP API request
    pub http_timeout_secs: u64,

    /// Timeout for every `eth_call`
    pub rpc_timeout_secs: u64,

    /// DefiLlama coins API
    pub price_api_url: String,

    /// DefiLlama TVL API
    pub llama_api_url: String,

    /// Katana APR service
    pub katana_apr_api: String,

    // ========== Rewards ==========
    /// yYB reward distributor; the yYB section stays "coming soon" without it
    #[serde(default)]
    pub yyb_reward_distributor: Option<String>,

    /// Vault whose shares the yYB distributor pays out
    #[serde(default)]
    pub yyb_reward_vault: Option<String>,

    // ========== Chains ==========
    /// Supported chains, in report order. Must stay the last field for TOML output
    pub chains: Vec<ChainConfig>,
}

/// Non-empty environment variable
fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env_opt(key).and_then(|s| s.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            chains: Self::default_chains(
                env_opt("RPC_MAINNET"),
                env_opt("RPC_ARBITRUM"),
                env_opt("RPC_BASE"),
                env_opt("RPC_KATANA"),
            ),
            data_dir: env_opt("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            output_file: env_opt("OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_file),
            http_timeout_secs: env_or("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs),
            rpc_timeout_secs: env_or("RPC_TIMEOUT_SECS", defaults.rpc_timeout_secs),
            price_api_url: env_opt("PRICE_API_URL").unwrap_or(defaults.price_api_url),
            llama_api_url: env_opt("LLAMA_API_URL").unwrap_or(defaults.llama_api_url),
            katana_apr_api: env_opt("KATANA_APR_API").unwrap_or(defaults.katana_apr_api),
            yyb_reward_distributor: env_opt("YYB_REWARD_DISTRIBUTOR"),
            yyb_reward_vault: env_opt("YYB_REWARD_VAULT"),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Mainnet, Arbitrum, Base, Katana
    fn default_chains(
        mainnet: Option<String>,
        arbitrum: Option<String>,
        base: Option<String>,
        katana: Option<String>,
    ) -> Vec<ChainConfig> {
        vec![
            ChainConfig::new("mainnet", mainnet, 1, AprSource::Oracle),
            ChainConfig::new("arbitrum", arbitrum, 42161, AprSource::Oracle),
            ChainConfig::new("base", base, 8453, AprSource::Oracle),
            ChainConfig::new("katana", katana, 747474, AprSource::KatanaApi),
        ]
    }

    pub fn chain(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.name == name)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    /// Whether any configured chain takes its APRs from the Katana API
    pub fn needs_katana_feed(&self) -> bool {
        self.chains
            .iter()
            .any(|c| c.apr_source == AprSource::KatanaApi && c.is_configured())
    }

    /// yYB reward program, when both addresses are configured
    pub fn yyb_program(&self) -> Result<Option<RewardProgram>> {
        match (&self.yyb_reward_distributor, &self.yyb_reward_vault) {
            (Some(distributor), Some(vault)) => {
                let distributor = Address::from_str(distributor)
                    .map_err(|e| eyre!("Invalid YYB_REWARD_DISTRIBUTOR {}: {}", distributor, e))?;
                let vault = Address::from_str(vault)
                    .map_err(|e| eyre!("Invalid YYB_REWARD_VAULT {}: {}", vault, e))?;
                Ok(Some(RewardProgram::yyb(distributor, vault)))
            }
            (None, None) => Ok(None),
            _ => Err(eyre!(
                "YYB_REWARD_DISTRIBUTOR and YYB_REWARD_VAULT must be set together"
            )),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chains.is_empty() {
            return Err(eyre!("No chains configured"));
        }

        let mut seen = HashSet::new();
        for chain in &self.chains {
            if !seen.insert(chain.chain_id) {
                return Err(eyre!(
                    "Duplicate chain id {} ({})",
                    chain.chain_id,
                    chain.name
                ));
            }
        }

        if self.http_timeout_secs == 0 || self.rpc_timeout_secs == 0 {
            return Err(eyre!("Timeouts must be at least 1 second"));
        }

        if self.output_file.as_os_str().is_empty() {
            return Err(eyre!("OUTPUT_FILE is empty"));
        }

        self.yyb_program()?;

        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        use console::style;

        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              THE BLUE PILL - CONFIGURATION                 ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ CHAINS                                                     ║");
        for chain in &self.chains {
            let status = if chain.is_configured() {
                style("✓ RPC configured").green()
            } else {
                style("✗ Not set (skipped)").yellow()
            };
            println!("║ • {:<10} {:>8}  {:<36} ║", chain.name, chain.chain_id, status);
        }
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ PATHS                                                      ║");
        println!("║ • Data Dir:        {:<40} ║", self.data_dir.display());
        println!("║ • Output:          {:<40} ║", self.output_file.display());
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ NETWORK                                                    ║");
        println!("║ • HTTP Timeout:    {:<38}s ║", self.http_timeout_secs);
        println!("║ • RPC Timeout:     {:<38}s ║", self.rpc_timeout_secs);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ REWARDS                                                    ║");
        println!("║ • yCRV:            {:<40} ║", "✓ Mainnet distributor");
        println!("║ • yYB:             {:<40} ║",
            if self.yyb_reward_distributor.is_some() { "✓ Configured" } else { "✗ Not Set" }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chains: Self::default_chains(None, None, None, None),
            data_dir: PathBuf::from("./data"),
            output_file: PathBuf::from("./output.md"),
            http_timeout_secs: 15,
            rpc_timeout_secs: 30,
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            llama_api_url: DEFAULT_LLAMA_API_URL.to_string(),
            katana_apr_api: DEFAULT_KATANA_APR_API.to_string(),
            yyb_reward_distributor: None,
            yyb_reward_vault: None,
        }
    }
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        let names: Vec<&str> = config.chains.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["mainnet", "arbitrum", "base", "katana"]);
        assert!(config.chains.iter().all(|c| !c.is_configured()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_katana_uses_api() {
        let mut config = Config::default();
        assert_eq!(config.chain("katana").unwrap().apr_source, AprSource::KatanaApi);
        assert_eq!(config.chain("base").unwrap().apr_source, AprSource::Oracle);

        // Only needed once Katana actually has an RPC
        assert!(!config.needs_katana_feed());
        config.chains[3].rpc_url = Some("http://localhost:8545".to_string());
        assert!(config.needs_katana_feed());
    }

    #[test]
    fn test_duplicate_chain_id_rejected() {
        let mut config = Config::default();
        config.chains[1].chain_id = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = Config {
            rpc_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yyb_program() {
        let mut config = Config::default();
        assert!(config.yyb_program().unwrap().is_none());

        config.yyb_reward_distributor =
            Some("0x1111111111111111111111111111111111111111".to_string());
        assert!(config.yyb_program().is_err());

        config.yyb_reward_vault = Some("0x2222222222222222222222222222222222222222".to_string());
        let program = config.yyb_program().unwrap().unwrap();
        assert_eq!(program.series, "yyb");
        assert_eq!(program.vault, Address::repeat_byte(0x22));

        config.yyb_reward_vault = Some("not-an-address".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = std::env::temp_dir().join(format!("blue-pill-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let mut config = Config::default();
        config.chains[0].rpc_url = Some("https://eth.example".to_string());
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.chains, config.chains);
        assert_eq!(loaded.output_file, config.output_file);

        fs::remove_dir_all(&dir).ok();
    }
}
