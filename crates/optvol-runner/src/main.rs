//! # Option Study Runner
//!
//! Application entry point for the option profitability and
//! realized-volatility study.
//!
//! ## Description
//! Validates the study configuration, fans enrichment out across the
//! study years, then runs the chosen side's analysis and persists the
//! yearly summary table. Parameters come from an optional TOML config
//! file with command-line overrides.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Datelike;
use clap::Parser;
use optvol_engine::StudyConfig;
use optvol_models::Side;
use optvol_runner::{analyse, enrich_all, report_summary};
use optvol_store::{CsvMarketCapSource, StudyStore};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "optvol", about = "Option profitability and realized-volatility study")]
struct Cli {
    /// TOML configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// First study year (>= 1997).
    #[arg(long)]
    first_year: Option<i32>,
    /// Last study year (before the current year minus one).
    #[arg(long)]
    last_year: Option<i32>,
    /// Days to maturity; snapped to the quoted tenor set.
    #[arg(long)]
    horizon: Option<i64>,
    /// Payoff convention: "buy" or "sell".
    #[arg(long)]
    side: Option<String>,
    /// Directory holding the study tables.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Progress reports per enrichment batch.
    #[arg(long)]
    progress_steps: Option<usize>,
    /// Universe size (top N by market cap).
    #[arg(long)]
    market_cap_count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    study: StudySection,
}

#[derive(Debug, Default, Deserialize)]
struct StudySection {
    first_year: Option<i32>,
    last_year: Option<i32>,
    horizon: Option<i64>,
    side: Option<String>,
    data_dir: Option<PathBuf>,
    progress_steps: Option<usize>,
    market_cap_count: Option<usize>,
}

fn parse_side(label: &str) -> Result<Side> {
    match label {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        other => bail!("side must be \"buy\" or \"sell\", got {other:?}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str::<FileConfig>(&contents)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => FileConfig::default(),
    };
    let study = file.study;

    let current_year = chrono::Utc::now().year();
    let first_year = cli.first_year.or(study.first_year).unwrap_or(2001);
    let last_year = cli
        .last_year
        .or(study.last_year)
        .unwrap_or(current_year - 2);
    let horizon = cli.horizon.or(study.horizon).unwrap_or(91);
    let side = parse_side(
        cli.side
            .or(study.side)
            .unwrap_or_else(|| "buy".to_string())
            .as_str(),
    )?;
    let data_dir = cli
        .data_dir
        .or(study.data_dir)
        .unwrap_or_else(|| PathBuf::from("data"));

    let mut config = StudyConfig::new(first_year, last_year, horizon, current_year)?;
    if let Some(steps) = cli.progress_steps.or(study.progress_steps) {
        config = config.with_progress_steps(steps);
    }
    if let Some(count) = cli.market_cap_count.or(study.market_cap_count) {
        config = config.with_market_cap_count(count);
    }

    info!(
        "selected horizon is {} days (choices: 10, 30, 60, 91, 122, 152, 182, 273, 365, 547, 730)",
        config.horizon()
    );

    let store = StudyStore::new(&data_dir);
    let market_caps = CsvMarketCapSource::new(&data_dir);

    enrich_all(&store, &config).await?;

    let summary = analyse(&store, &config, &market_caps, side);
    report_summary(&summary);

    let path = store.write_summary(&summary)?;
    info!("summary table written to {}", path.display());
    Ok(())
}
