//! Markdown sections

use super::content::{self, fill};
use super::format::{fmt_change, fmt_eth, fmt_usd, group_thousands};
use crate::history::WeekStamp;
use crate::rewards::RewardSnapshot;
use crate::tvl::TvlSnapshot;
use crate::vaults::{TopVaults, Vault};

fn direction(change_pct: f64) -> &'static str {
    if change_pct > 0.0 {
        "increased"
    } else {
        "declined"
    }
}

pub fn render_overview(stamp: WeekStamp) -> String {
    let body = fill(
        content::OVERVIEW,
        &[
            ("week", stamp.week.to_string()),
            ("year", stamp.year.to_string()),
        ],
    );
    format!("## Overview{}", body)
}

pub fn render_glance(tvl: &TvlSnapshot) -> String {
    let mut lines = vec!["## Yearn at a glance".to_string()];

    let comparison = tvl
        .previous
        .and_then(|prev| prev.wow_usd_pct.map(|wow| (prev, wow)));
    match comparison {
        Some((prev, wow)) => lines.push(format!(
            "Yearn TVL {} week-over-week by **~{:.0}%**, from **{}** (**{} ETH**) to **{}** (**{} ETH**).",
            direction(wow),
            wow.abs(),
            fmt_usd(prev.tvl_usd),
            group_thousands(prev.tvl_eth, 0),
            fmt_usd(tvl.tvl_usd),
            group_thousands(tvl.tvl_eth, 0),
        )),
        None => lines.push(format!(
            "Yearn TVL: **{}** (**{} ETH**)",
            fmt_usd(tvl.tvl_usd),
            group_thousands(tvl.tvl_eth, 0),
        )),
    }

    lines.push(String::new());

    let defi_prior = tvl
        .previous
        .and_then(|prev| prev.defi)
        .and_then(|defi| defi.wow_pct.map(|wow| (defi, wow)));
    match defi_prior {
        Some((prior, wow)) => lines.push(format!(
            "Total DeFi TVL {} week-over-week by **~{:.0}%**, from **{}** (**{}**) to **{}** (**{}**),",
            direction(wow),
            wow.abs(),
            fmt_usd(prior.usd),
            fmt_eth(prior.eth),
            fmt_usd(tvl.defi_tvl_usd),
            fmt_eth(tvl.defi_tvl_eth),
        )),
        None => lines.push(format!(
            "Total DeFi TVL: **{}** (**{}**),",
            fmt_usd(tvl.defi_tvl_usd),
            fmt_eth(tvl.defi_tvl_eth),
        )),
    }

    match tvl.yearn_share_defi {
        Some(share) => lines.push(format!("with Yearn's share at **{:.2}%**.", share)),
        None => lines.push("with Yearn's share at **N/A**.".to_string()),
    }

    lines.join("\n")
}

fn vault_line(vault: &Vault) -> String {
    format!(
        "- [**{}**]({}) ({}): **{:.2}%** APR | {} TVL",
        vault.name,
        vault.url(),
        vault.chain,
        vault.apr_pct,
        fmt_usd(vault.tvl_usd)
    )
}

pub fn render_vaults(top: &TopVaults) -> String {
    let mut lines = vec!["## Vaults".to_string()];

    let intro = content::VAULTS_INTRO.trim();
    if !intro.is_empty() {
        lines.push(intro.to_string());
    }

    if top.is_empty() {
        lines.push(content::COMING_SOON.to_string());
        return lines.join("\n");
    }

    if !top.stable.is_empty() {
        lines.push("**Top Stablecoin Vaults:**".to_string());
        lines.extend(top.stable.iter().map(vault_line));
    }

    if !top.crypto.is_empty() {
        lines.push(String::new());
        lines.push("**Top Crypto Vaults:**".to_string());
        lines.extend(top.crypto.iter().map(vault_line));
    }

    lines.join("\n")
}

/// `## {label}` section; "Coming soon!" without data
pub fn render_rewards(label: &str, snapshot: Option<&RewardSnapshot>) -> String {
    let Some(snap) = snapshot else {
        return format!("## {}\n{}\n", label, content::COMING_SOON);
    };

    let rewards = group_thousands(snap.rewards_crvusd, 2);
    let body = match (snap.prev_rewards_crvusd, snap.wow_pct) {
        (Some(prev), Some(wow)) => fill(
            content::REWARDS_COMPARATIVE,
            &[
                ("label", label.to_string()),
                ("rewards", rewards),
                ("prev_rewards", group_thousands(prev, 2)),
                ("wow", fmt_change(wow)),
            ],
        ),
        _ => fill(
            content::REWARDS_CURRENT,
            &[("label", label.to_string()), ("rewards", rewards)],
        ),
    };

    format!("## {}{}", label, body)
}

pub fn render_alpha() -> String {
    format!("## Alpha Corner{}", content::ALPHA)
}

pub fn render_disclaimer() -> String {
    format!("## Disclaimer{}", content::DISCLAIMER)
}

pub fn render_sign_off() -> String {
    content::SIGN_OFF.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{RewardRecord, TvlRecord, SCHEMA_VERSION};
    use crate::rewards::{RewardProgram, RewardReading};
    use crate::tvl::TvlInputs;
    use alloy_primitives::{Address, U256};

    const INPUTS: TvlInputs = TvlInputs {
        tvl_usd: 4.4e9,
        defi_tvl_usd: 110e9,
        ya_tvl_usd: 11e9,
    };

    fn prev_tvl() -> TvlRecord {
        TvlRecord {
            schema: SCHEMA_VERSION,
            week: 2,
            year: 2026,
            tvl_usd: 4.0e9,
            tvl_eth: 1.0e6,
            defi_tvl_usd: Some(100e9),
            ya_tvl_usd: Some(10e9),
        }
    }

    fn reward_snapshot(prev: Option<f64>) -> RewardSnapshot {
        let reading = RewardReading {
            distributor_week: 99,
            reward_shares: U256::from(12_345_670_000_000_000_000_000u128),
            price_per_share: U256::from(1_000_000_000_000_000_000u128),
        };
        let record = prev.map(|rewards_crvusd| RewardRecord {
            schema: SCHEMA_VERSION,
            week: 2,
            year: 2026,
            distributor_week: 98,
            rewards_vault_tokens: rewards_crvusd,
            rewards_crvusd,
            price_per_share: 1.0,
        });
        RewardSnapshot::compute(&RewardProgram::ycrv(), WeekStamp::new(3, 2026), reading, record.as_ref())
    }

    fn vault(name: &str, apr_pct: f64) -> Vault {
        Vault {
            name: name.to_string(),
            chain: "base".to_string(),
            chain_id: 8453,
            address: Address::repeat_byte(0x11),
            asset: Address::ZERO,
            apr_pct,
            tvl_usd: 2_500_000.0,
        }
    }

    #[test]
    fn test_overview_has_week() {
        let text = render_overview(WeekStamp::new(41, 2026));
        assert!(text.starts_with("## Overview\nWelcome to **The Blue Pill** - *Week 41, 2026*."));
    }

    #[test]
    fn test_glance_comparative() {
        let prev = prev_tvl();
        let snap = TvlSnapshot::compute(WeekStamp::new(3, 2026), INPUTS, 4_000.0, Some(&prev));
        let text = render_glance(&snap);

        assert!(text.contains(
            "Yearn TVL increased week-over-week by **~10%**, from **$4.00B** (**1,000,000 ETH**) to **$4.40B** (**1,100,000 ETH**)."
        ));
        assert!(text.contains(
            "Total DeFi TVL increased week-over-week by **~10%**, from **$100.00B** (**25.00M ETH**) to **$110.00B** (**27.50M ETH**),"
        ));
        assert!(text.ends_with("with Yearn's share at **4.00%**."));
    }

    #[test]
    fn test_glance_without_history() {
        let snap = TvlSnapshot::compute(WeekStamp::new(3, 2026), INPUTS, 4_000.0, None);
        let text = render_glance(&snap);
        assert!(text.contains("Yearn TVL: **$4.40B** (**1,100,000 ETH**)"));
        assert!(text.contains("Total DeFi TVL: **$110.00B** (**27.50M ETH**),"));
    }

    #[test]
    fn test_glance_decline() {
        let mut prev = prev_tvl();
        prev.tvl_usd = 5.0e9;
        let snap = TvlSnapshot::compute(WeekStamp::new(3, 2026), INPUTS, 4_000.0, Some(&prev));
        assert!(render_glance(&snap).contains("Yearn TVL declined week-over-week by **~12%**"));
    }

    #[test]
    fn test_vault_lines() {
        let top = TopVaults {
            stable: vec![vault("USDC yVault", 7.891)],
            crypto: vec![vault("WETH yVault", 3.2)],
        };
        let text = render_vaults(&top);
        let expected = format!(
            "- [**USDC yVault**](https://yearn.fi/v3/8453/{}) (base): **7.89%** APR | $2.5M TVL",
            Address::repeat_byte(0x11)
        );
        assert!(text.contains(&expected));
        assert!(text.contains("\n\n**Top Crypto Vaults:**\n- [**WETH yVault**]"));
    }

    #[test]
    fn test_vaults_coming_soon() {
        assert_eq!(render_vaults(&TopVaults::default()), "## Vaults\nComing soon!");
    }

    #[test]
    fn test_rewards_comparative() {
        let text = render_rewards("yCRV", Some(&reward_snapshot(Some(10_000.0))));
        assert!(text.starts_with("## yCRV\nThis week yCRV stakers received **12,345.67 crvUSD** rewards"));
        assert!(text.contains("compared to **10,000.00 crvUSD** in the prior week"));
        assert!(text.contains("week-over-week change of **+23.5%**"));
    }

    #[test]
    fn test_rewards_without_history() {
        let text = render_rewards("yCRV", Some(&reward_snapshot(None)));
        assert_eq!(text, "## yCRV\nThis week yCRV stakers received **12,345.67 crvUSD** rewards.\n");
    }

    #[test]
    fn test_rewards_coming_soon() {
        assert_eq!(render_rewards("yYB", None), "## yYB\nComing soon!\n");
    }
}
