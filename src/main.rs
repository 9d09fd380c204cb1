//! The Blue Pill - Weekly Yearn Newsletter Generator
//!
//! Run with: cargo run -- [--stdout] [--no-save]
//!
//! Pulls TVL from DefiLlama, ranks multi-strategy vaults on every configured
//! chain, reads yCRV/yYB staker rewards and renders a Markdown issue with
//! week-over-week comparisons against the local history files.

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use console::style;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod history;
mod multicall;
mod newsletter;
mod price_oracle;
mod report;
mod rewards;
mod tokens;
mod tvl;
mod vaults;

use config::Config;
use history::{HistoryStore, WeekStamp};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate The Blue Pill weekly newsletter", long_about = None)]
struct Args {
    /// Markdown output file (overrides OUTPUT_FILE)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// History directory (overrides DATA_DIR)
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Load configuration from a TOML file instead of the environment
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Print the newsletter instead of writing the output file
    #[arg(long)]
    stdout: bool,

    /// Render without updating the history files
    #[arg(long)]
    no_save: bool,

    /// Write the effective configuration as TOML and exit
    #[arg(long, value_name = "PATH")]
    dump_config: Option<PathBuf>,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").blue()
    );
    println!(
        "{}",
        style(" 💊 THE BLUE PILL - Weekly Yearn Newsletter").blue().bold()
    );
    println!(
        "{}",
        style("    TVL | Top Vaults | yCRV & yYB Rewards").blue()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").blue()
    );
    println!();
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load {}", path.display()))?,
        None => Config::from_env()?,
    };

    if let Some(output) = &args.output {
        config.output_file = output.clone();
    }
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blue_pill=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(path) = &args.dump_config {
        config.save_to_file(path)?;
        println!("{} Configuration written to {}", style("✓").green().bold(), path.display());
        return Ok(());
    }

    if !args.stdout {
        print_banner();
        config.print_summary();
    }

    let started = Instant::now();
    let stamp = WeekStamp::today();
    info!("Generating issue for {}", stamp);

    let collected = newsletter::collect(&config, stamp).await?;

    let store = HistoryStore::new(&config.data_dir);
    let issue = newsletter::assemble(&collected, &store, !args.no_save)?;

    if args.stdout {
        println!("{}", issue.markdown);
        return Ok(());
    }

    if let Some(parent) = config.output_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&config.output_file, &issue.markdown)
        .wrap_err_with(|| format!("Failed to write {}", config.output_file.display()))?;

    println!(
        "{} Newsletter generated: {} ({:.1}s)",
        style("✓").green().bold(),
        config.output_file.display(),
        started.elapsed().as_secs_f64()
    );
    println!(
        "  {} stable / {} crypto vaults, yCRV {}, yYB {}",
        issue.data.vaults.stable.len(),
        issue.data.vaults.crypto.len(),
        if issue.data.ycrv.is_some() { "✓" } else { "coming soon" },
        if issue.data.yyb.is_some() { "✓" } else { "coming soon" },
    );
    if args.no_save {
        println!("{}", style("  History not updated (--no-save)").yellow());
    }

    Ok(())
}
