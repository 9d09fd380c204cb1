//! Diagnostic tool - Check configuration and RPC connectivity
//!
//! Run with: cargo run --bin diagnose

use alloy_provider::{Provider, ProviderBuilder};
use color_eyre::eyre::{eyre, Result};
use console::style;
use std::env;
use std::time::Duration;

/// (env var, chain, expected chain id)
const CHAINS: &[(&str, &str, u64)] = &[
    ("RPC_MAINNET", "mainnet", 1),
    ("RPC_ARBITRUM", "arbitrum", 42161),
    ("RPC_BASE", "base", 8453),
    ("RPC_KATANA", "katana", 747474),
];

fn shorten(url: &str) -> String {
    let chars: Vec<char> = url.chars().collect();
    if chars.len() > 50 {
        let head: String = chars[..30].iter().collect();
        let tail: String = chars[chars.len() - 15..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        url.to_string()
    }
}

async fn check_rpc(url: &str, timeout: Duration) -> Result<(u64, u64)> {
    let provider = ProviderBuilder::new().connect_http(url.parse().map_err(|e| eyre!("Invalid URL: {}", e))?);

    let probe = async {
        let chain_id = provider.get_chain_id().await?;
        let block = provider.get_block_number().await?;
        Ok::<_, color_eyre::eyre::Report>((chain_id, block))
    };

    tokio::time::timeout(timeout, probe)
        .await
        .map_err(|_| eyre!("timed out after {:?}", timeout))?
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    println!("🔍 BLUE PILL DIAGNOSTIC CHECK\n");

    dotenvy::dotenv().ok();

    println!("═══════════════════════════════════════════════════");
    println!("                  CONFIGURATION                     ");
    println!("═══════════════════════════════════════════════════\n");

    let checks = [
        ("DATA_DIR", "./data", "History cache directory"),
        ("OUTPUT_FILE", "./output.md", "Rendered newsletter"),
        ("HTTP_TIMEOUT_SECS", "15", "DefiLlama / Katana API timeout"),
        ("RPC_TIMEOUT_SECS", "30", "eth_call timeout"),
    ];

    for (key, default, desc) in checks {
        let value = env::var(key).unwrap_or_else(|_| default.to_string());
        let marker = if env::var(key).is_err() { "(default)" } else { "(from .env)" };
        println!("  {}: {} {}", key, value, marker);
        println!("    └─ {}\n", desc);
    }

    let yyb_distributor = env::var("YYB_REWARD_DISTRIBUTOR").is_ok();
    let yyb_vault = env::var("YYB_REWARD_VAULT").is_ok();
    println!(
        "  yYB rewards: {}",
        match (yyb_distributor, yyb_vault) {
            (true, true) => "✅ Configured",
            (false, false) => "➖ Not configured (section says coming soon)",
            _ => "❌ YYB_REWARD_DISTRIBUTOR and YYB_REWARD_VAULT must be set together",
        }
    );

    let timeout = env::var("RPC_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30));

    println!("\n═══════════════════════════════════════════════════");
    println!("                 RPC CONNECTIVITY                   ");
    println!("═══════════════════════════════════════════════════\n");

    let mut reachable = 0;
    for (key, chain, expected_id) in CHAINS {
        let Some(url) = env::var(key).ok().filter(|u| !u.trim().is_empty()) else {
            println!("  {:<10} {} ({} not set, chain skipped)", chain, style("➖").dim(), key);
            continue;
        };

        match check_rpc(url.trim(), timeout).await {
            Ok((chain_id, block)) if chain_id == *expected_id => {
                reachable += 1;
                println!("  {:<10} ✅ block {} via {}", chain, block, shorten(&url));
            }
            Ok((chain_id, _)) => {
                println!(
                    "  {:<10} ❌ {} reports chain id {}, expected {}",
                    chain, key, chain_id, expected_id
                );
            }
            Err(e) => println!("  {:<10} ❌ {}", chain, e),
        }
    }

    println!("\n═══════════════════════════════════════════════════");
    println!("                     STATUS                         ");
    println!("═══════════════════════════════════════════════════\n");

    if env::var("RPC_MAINNET").is_err() {
        println!("  ⚠️  RPC_MAINNET not set: no mainnet vaults, yCRV says coming soon");
    }
    if reachable == 0 {
        println!("  ⚠️  No chain reachable: the vaults section will say coming soon");
    } else {
        println!("  ✅ {} of {} chains reachable", reachable, CHAINS.len());
    }
    println!();

    Ok(())
}
