//! One newsletter run
//!
//! `collect` does all network I/O. `assemble` compares against history,
//! renders, and only then writes the cache. Nothing touches disk until every
//! critical figure is in hand.

use eyre::{Result, WrapErr};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::Config;
use crate::history::{HistoryStore, RewardRecord, TvlRecord, WeekStamp};
use crate::multicall::RpcReader;
use crate::price_oracle::{PriceOracle, SpotPrices};
use crate::report::format::{fmt_eth, fmt_pct, fmt_usd};
use crate::report::{render_newsletter, NewsletterData};
use crate::rewards::{read_rewards, RewardProgram, RewardReading, RewardSnapshot};
use crate::tvl::{TvlInputs, TvlSnapshot, TvlSource, TVL_SERIES};
use crate::vaults::{collect_top_vaults, fetch_katana_aprs, AprFeed, TopVaults};

/// Raw inputs for one run
#[derive(Debug, Clone)]
pub struct Collected {
    pub stamp: WeekStamp,
    pub prices: SpotPrices,
    pub tvl: TvlInputs,
    pub vaults: TopVaults,
    pub ycrv: Option<(RewardProgram, RewardReading)>,
    pub yyb: Option<(RewardProgram, RewardReading)>,
}

/// Rendered issue plus the numbers behind it
#[derive(Debug, Clone)]
pub struct Newsletter {
    pub data: NewsletterData,
    pub markdown: String,
}

/// Fetch everything the issue needs
pub async fn collect(config: &Config, stamp: WeekStamp) -> Result<Collected> {
    let http_client = Client::builder()
        .timeout(config.http_timeout())
        .build()
        .wrap_err("Failed to build HTTP client")?;

    let prices = PriceOracle::new(http_client.clone(), &config.price_api_url)
        .fetch_spot_prices()
        .await
        .wrap_err("Spot prices unavailable")?;

    let tvl = TvlSource::new(http_client.clone(), &config.llama_api_url)
        .fetch_inputs()
        .await
        .wrap_err("TVL unavailable")?;

    let katana = if config.needs_katana_feed() {
        fetch_katana_aprs(&http_client, &config.katana_apr_api).await
    } else {
        AprFeed::Unavailable
    };

    let vaults = collect_top_vaults(config, &prices, &katana).await;

    let mainnet = config
        .chain("mainnet")
        .and_then(|c| c.rpc_url.clone())
        .map(|url| RpcReader::new(url, config.rpc_timeout()));

    let ycrv = match &mainnet {
        Some(reader) => {
            let program = RewardProgram::ycrv();
            let reading = read_rewards(reader, &program)
                .await
                .wrap_err("yCRV rewards unavailable")?;
            Some((program, reading))
        }
        None => {
            warn!("RPC_MAINNET not set, yCRV section will say coming soon");
            None
        }
    };

    let yyb = match (config.yyb_program()?, &mainnet) {
        (Some(program), Some(reader)) => match read_rewards(reader, &program).await {
            Ok(reading) => Some((program, reading)),
            Err(e) => {
                warn!("yYB rewards unavailable: {}", e);
                None
            }
        },
        _ => None,
    };

    Ok(Collected {
        stamp,
        prices,
        tvl,
        vaults,
        ycrv,
        yyb,
    })
}

fn reward_snapshot(
    store: &HistoryStore,
    stamp: WeekStamp,
    input: Option<&(RewardProgram, RewardReading)>,
) -> Result<Option<RewardSnapshot>> {
    let Some((program, reading)) = input else {
        return Ok(None);
    };
    let prev: Option<RewardRecord> = store.load_previous(&program.series, stamp)?;
    let snap = RewardSnapshot::compute(program, stamp, *reading, prev.as_ref());
    snap.log();
    Ok(Some(snap))
}

/// Compare with last week, render, then save this week's records
pub fn assemble(collected: &Collected, store: &HistoryStore, persist: bool) -> Result<Newsletter> {
    let stamp = collected.stamp;

    let prev_tvl: Option<TvlRecord> = store.load_previous(TVL_SERIES, stamp)?;
    let tvl = TvlSnapshot::compute(stamp, collected.tvl, collected.prices.eth, prev_tvl.as_ref());
    info!(
        "📊 TVL {} -> WoW {} (USD), {} (ETH)",
        stamp,
        fmt_pct(tvl.previous.and_then(|p| p.wow_usd_pct)),
        fmt_pct(tvl.previous.and_then(|p| p.wow_eth_pct)),
    );
    info!(
        "📊 Yield aggregators {} ({}), Yearn share {}, WoW {}",
        fmt_usd(tvl.ya_tvl_usd),
        fmt_eth(tvl.ya_tvl_eth),
        tvl.yearn_share_ya
            .map(|s| format!("{:.2}%", s))
            .unwrap_or_else(|| "N/A".to_string()),
        fmt_pct(tvl.previous.and_then(|p| p.ya).and_then(|ya| ya.wow_pct)),
    );

    let ycrv = reward_snapshot(store, stamp, collected.ycrv.as_ref())?;
    let yyb = reward_snapshot(store, stamp, collected.yyb.as_ref())?;

    let data = NewsletterData {
        stamp,
        tvl,
        vaults: collected.vaults.clone(),
        ycrv,
        yyb,
    };
    let markdown = render_newsletter(&data);

    if persist {
        // every series is staged before any file is replaced
        let mut staged = vec![store
            .stage(TVL_SERIES, &data.tvl.to_record())
            .wrap_err("Failed to save tvl history")?];
        for snap in data.ycrv.iter().chain(data.yyb.iter()) {
            staged.push(
                store
                    .stage(&snap.series, &snap.to_record())
                    .wrap_err_with(|| format!("Failed to save {} history", snap.series))?,
            );
        }
        for write in staged {
            write.commit()?;
        }
    }

    Ok(Newsletter { data, markdown })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use std::fs;

    fn temp_store(tag: &str) -> (std::path::PathBuf, HistoryStore) {
        let dir = std::env::temp_dir().join(format!("blue-pill-run-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let store = HistoryStore::new(&dir);
        (dir, store)
    }

    fn collected(stamp: WeekStamp, tvl_usd: f64, reward_shares: u128) -> Collected {
        Collected {
            stamp,
            prices: SpotPrices {
                eth: 4_000.0,
                btc: 100_000.0,
                sky: 0.07,
                yyb: 0.5,
            },
            tvl: TvlInputs {
                tvl_usd,
                defi_tvl_usd: 100e9,
                ya_tvl_usd: 10e9,
            },
            vaults: TopVaults::default(),
            ycrv: Some((
                RewardProgram::ycrv(),
                RewardReading {
                    distributor_week: 40,
                    reward_shares: U256::from(reward_shares),
                    price_per_share: U256::from(1_000_000_000_000_000_000u128),
                },
            )),
            yyb: None,
        }
    }

    #[test]
    fn test_rerun_same_week_is_idempotent() {
        let (dir, store) = temp_store("idempotent");
        let run = collected(WeekStamp::new(12, 2026), 4e9, 5_000_000_000_000_000_000_000);

        let first = assemble(&run, &store, true).unwrap();
        let tvl_len = store.load_history(TVL_SERIES).unwrap().len();
        let ycrv_len = store.load_history("ycrv").unwrap().len();

        let second = assemble(&run, &store, true).unwrap();

        assert_eq!(first.markdown, second.markdown);
        assert_eq!(store.load_history(TVL_SERIES).unwrap().len(), tvl_len);
        assert_eq!(store.load_history("ycrv").unwrap().len(), ycrv_len);
        assert_eq!(tvl_len, 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_second_week_compares() {
        let (dir, store) = temp_store("compare");

        assemble(&collected(WeekStamp::new(12, 2026), 4e9, 5_000_000_000_000_000_000_000), &store, true).unwrap();
        let next = assemble(&collected(WeekStamp::new(13, 2026), 5e9, 6_000_000_000_000_000_000_000), &store, true)
            .unwrap();

        assert!(next.markdown.contains("Yearn TVL increased week-over-week by **~25%**"));
        assert!(next.markdown.contains("week-over-week change of **+20.0%**"));
        assert!(next.markdown.contains("## yYB\nComing soon!"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_save_leaves_every_series_untouched() {
        let (dir, store) = temp_store("partial");
        assemble(&collected(WeekStamp::new(11, 2026), 4e9, 1), &store, true).unwrap();
        let tvl_before = fs::read_to_string(store.path(TVL_SERIES)).unwrap();
        let ycrv_before = fs::read_to_string(store.path("ycrv")).unwrap();

        // the ycrv temp file cannot be created, tvl stages fine
        fs::create_dir_all(store.path("ycrv").with_extension("json.tmp")).unwrap();

        let result = assemble(&collected(WeekStamp::new(12, 2026), 5e9, 2), &store, true);
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(store.path(TVL_SERIES)).unwrap(), tvl_before);
        assert_eq!(fs::read_to_string(store.path("ycrv")).unwrap(), ycrv_before);
        assert!(!store.path(TVL_SERIES).with_extension("json.tmp").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_save_leaves_cache_untouched() {
        let (dir, store) = temp_store("nosave");
        assemble(&collected(WeekStamp::new(12, 2026), 4e9, 1), &store, false).unwrap();
        assert!(!store.path(TVL_SERIES).exists());
        assert!(!dir.exists());
    }
}
