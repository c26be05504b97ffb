//! # Pipeline Stages
//!
//! Year-level enrichment and analysis drivers over the store.

use anyhow::{Context, Result};
use optvol_engine::{
    aggregate_year, compute_payoffs, summarize_study, universe_for_year, MarketCapSource,
    RecordEnricher, StudyConfig, TimeWindowIndex,
};
use optvol_models::{Side, StudySummary, YearlySummary};
use optvol_store::StudyStore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// What a single year's enrichment job did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// Computed and persisted the enriched table.
    Enriched { retained: usize },
    /// The enriched table already existed; nothing recomputed.
    SkippedExisting,
}

/// Enriches one study year: loads the adjacent raw partitions, builds the
/// year's window index, computes the window statistics and persists the
/// enriched table.
///
/// Idempotent: an existing enriched table short-circuits without
/// recomputation. A missing raw partition (the year's own or an adjacent
/// one) is an error isolated to this year.
pub fn enrich_year(store: &StudyStore, config: &StudyConfig, year: i32) -> Result<EnrichOutcome> {
    let horizon = config.horizon();
    if store.enriched_exists(year, horizon) {
        info!("enriched dataset exists for year {year}");
        return Ok(EnrichOutcome::SkippedExisting);
    }

    info!("data processing started for year {year}");
    let prior = store
        .load_raw(year - 1, horizon)
        .with_context(|| format!("loading prior-year partition for {year}"))?;
    let current = store
        .load_raw(year, horizon)
        .with_context(|| format!("loading raw partition for {year}"))?;
    let next = store
        .load_raw(year + 1, horizon)
        .with_context(|| format!("loading next-year partition for {year}"))?;

    let index = TimeWindowIndex::build(
        [prior.as_slice(), current.as_slice(), next.as_slice()],
        year,
        horizon,
    );
    let enricher = RecordEnricher::new(&index, horizon, config.progress_steps());
    let enriched = enricher.enrich(&current, year);
    let retained = enriched.len();

    store
        .write_enriched(year, horizon, &enriched)
        .with_context(|| format!("persisting enriched table for {year}"))?;
    Ok(EnrichOutcome::Enriched { retained })
}

/// Runs [`enrich_year`] for every study year as parallel blocking tasks.
///
/// A failing year is reported and skipped; siblings continue and their
/// persisted output remains valid.
pub async fn enrich_all(store: &StudyStore, config: &StudyConfig) -> Result<()> {
    let mut tasks = JoinSet::new();
    for year in config.years() {
        let store = store.clone();
        let config = config.clone();
        tasks.spawn_blocking(move || (year, enrich_year(&store, &config, year)));
    }

    while let Some(joined) = tasks.join_next().await {
        let (year, outcome) = joined.context("enrichment task panicked")?;
        if let Err(err) = outcome {
            warn!("enrichment failed for year {year}: {err:#}");
        }
    }
    Ok(())
}

/// Analyses one study year: selects the universe, computes payoffs and
/// reduces them to the year's summary row.
///
/// Returns `Ok(None)` when the year's enriched table is missing; the year
/// is skipped and the run continues.
pub fn analyse_year(
    store: &StudyStore,
    config: &StudyConfig,
    market_caps: &dyn MarketCapSource,
    side: Side,
    year: i32,
) -> Result<Option<YearlySummary>> {
    let horizon = config.horizon();
    if !store.enriched_exists(year, horizon) {
        info!("enriched dataset missing for year {year}, skipping");
        return Ok(None);
    }

    let enriched = store.load_enriched(year, horizon)?;
    let universe = universe_for_year(market_caps, year, config.market_cap_count())?;
    let payoffs = compute_payoffs(&enriched, &universe, side);
    info!(
        "{}-side analysis completed for year {year} over {} records",
        side.label(),
        payoffs.len()
    );
    Ok(Some(aggregate_year(year, &payoffs)))
}

/// Analyses every study year and assembles the study summary.
///
/// Per-year failures (missing data, exhausted universe lookahead) are
/// reported and skipped; the summary holds rows only for completed years.
pub fn analyse(
    store: &StudyStore,
    config: &StudyConfig,
    market_caps: &dyn MarketCapSource,
    side: Side,
) -> StudySummary {
    info!(
        "top {} firms by market cap studied between {} - {}",
        config.market_cap_count(),
        config.first_year(),
        config.last_year()
    );

    let mut years = Vec::new();
    for year in config.years() {
        match analyse_year(store, config, market_caps, side, year) {
            Ok(Some(summary)) => years.push(summary),
            Ok(None) => {}
            Err(err) => warn!("analysis failed for year {year}: {err:#}"),
        }
    }
    summarize_study(
        side,
        config.horizon(),
        config.first_year(),
        config.last_year(),
        years,
    )
}

/// Logs the study result the way the operator reads it.
pub fn report_summary(summary: &StudySummary) {
    let side = summary.side.label().to_uppercase();
    info!("═══════════════════════════════════════════");
    info!("        OPTION STUDY RESULTS ({side})");
    info!("═══════════════════════════════════════════");
    info!("Horizon:        {} days", summary.horizon);
    info!("Period:         {} - {}", summary.first_year, summary.last_year);
    info!("Years reported: {}", summary.years.len());
    info!("───────────────────────────────────────────");
    for year in &summary.years {
        info!(
            "{}: n={}, fwd/hist={:.3}, call gain={:.4}, put gain={:.4}",
            year.year,
            year.count,
            year.forward_to_trailing_vol,
            year.call_mean_gain,
            year.put_mean_gain
        );
    }
    info!("───────────────────────────────────────────");
    info!(
        "average annualised gain to {side} CALL is {:.2}%",
        summary.call_annualized_gain * 100.0
    );
    info!(
        "average annualised gain to {side} PUT is {:.2}%",
        summary.put_annualized_gain * 100.0
    );
    info!("═══════════════════════════════════════════");
}
