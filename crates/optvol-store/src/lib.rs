//! # Study Table Store
//!
//! CSV persistence for the per-year study tables and the summary output.
//!
//! ## Description
//! The pipeline materializes one raw and one enriched table per study
//! year and horizon. Existence checks make reruns idempotent: a year
//! whose enriched table already exists is skipped without recomputation,
//! and a missing table for a study year skips that year's analysis
//! without aborting the run.
//!
//! File layout under the data directory:
//! - `study_table_{year}_{horizon}_raw.csv` — acquisition output.
//! - `study_table_{year}_{horizon}_enriched.csv` — enrichment output.
//! - `market_cap_{date}.csv` — per-date universe snapshots.
//! - `summary_{side}_{first}-{last}_{horizon}.csv` — yearly summary rows.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use optvol_engine::MarketCapSource;
use optvol_models::{EnrichedRecord, Horizon, MarketCapRecord, OptionRecord, Side, StudySummary};
use tracing::warn;

/// Handle on the study's data directory.
#[derive(Debug, Clone)]
pub struct StudyStore {
    data_dir: PathBuf,
}

impl StudyStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn raw_path(&self, year: i32, horizon: Horizon) -> PathBuf {
        self.data_dir
            .join(format!("study_table_{year}_{horizon}_raw.csv"))
    }

    pub fn enriched_path(&self, year: i32, horizon: Horizon) -> PathBuf {
        self.data_dir
            .join(format!("study_table_{year}_{horizon}_enriched.csv"))
    }

    pub fn summary_path(&self, side: Side, first_year: i32, last_year: i32, horizon: Horizon) -> PathBuf {
        self.data_dir.join(format!(
            "summary_{}_{first_year}-{last_year}_{horizon}.csv",
            side.label()
        ))
    }

    pub fn raw_exists(&self, year: i32, horizon: Horizon) -> bool {
        self.raw_path(year, horizon).is_file()
    }

    pub fn enriched_exists(&self, year: i32, horizon: Horizon) -> bool {
        self.enriched_path(year, horizon).is_file()
    }

    /// Loads a year's raw table.
    ///
    /// Rows whose identifier failed the acquisition match (empty field)
    /// are excluded here rather than silently inheriting a neighbor's
    /// identifier.
    pub fn load_raw(&self, year: i32, horizon: Horizon) -> Result<Vec<OptionRecord>> {
        let rows: Vec<OptionRecord> = load_csv(&self.raw_path(year, horizon))?;
        let total = rows.len();
        let matched: Vec<OptionRecord> = rows
            .into_iter()
            .filter(|row| !row.identifier.is_empty())
            .collect();
        if matched.len() < total {
            warn!(
                "excluded {} unmatched-identifier rows from raw table for year {}",
                total - matched.len(),
                year
            );
        }
        Ok(matched)
    }

    pub fn write_raw(&self, year: i32, horizon: Horizon, rows: &[OptionRecord]) -> Result<PathBuf> {
        let path = self.raw_path(year, horizon);
        write_csv(&path, rows)?;
        Ok(path)
    }

    pub fn load_enriched(&self, year: i32, horizon: Horizon) -> Result<Vec<EnrichedRecord>> {
        load_csv(&self.enriched_path(year, horizon))
    }

    pub fn write_enriched(
        &self,
        year: i32,
        horizon: Horizon,
        rows: &[EnrichedRecord],
    ) -> Result<PathBuf> {
        let path = self.enriched_path(year, horizon);
        write_csv(&path, rows)?;
        Ok(path)
    }

    /// Writes the yearly summary rows of a completed study.
    pub fn write_summary(&self, summary: &StudySummary) -> Result<PathBuf> {
        let path = self.summary_path(
            summary.side,
            summary.first_year,
            summary.last_year,
            summary.horizon,
        );
        write_csv(&path, &summary.years)?;
        Ok(path)
    }
}

/// CSV-file-backed market-cap snapshots, one file per reference date.
///
/// A missing file for a date is an empty snapshot (market closure or
/// missing calendar data), which drives the reference-date roll-forward
/// in universe selection.
#[derive(Debug, Clone)]
pub struct CsvMarketCapSource {
    data_dir: PathBuf,
}

impl CsvMarketCapSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("market_cap_{date}.csv"))
    }
}

impl MarketCapSource for CsvMarketCapSource {
    fn snapshot(&self, date: NaiveDate) -> Vec<MarketCapRecord> {
        let path = self.path_for(date);
        if !path.is_file() {
            return Vec::new();
        }
        match load_csv(&path) {
            Ok(rows) => rows,
            Err(err) => {
                warn!("unreadable market-cap snapshot {}: {err:#}", path.display());
                Vec::new()
            }
        }
    }
}

/// Loads serde-typed rows from a CSV file.
fn load_csv<T: for<'de> serde::Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV file {}", path.display()))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .with_context(|| format!("parsing CSV file {}", path.display()))
}

/// Writes serde-typed rows to a CSV file, creating parent directories.
fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating CSV file {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing CSV row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing CSV file {}", path.display()))?;
    Ok(())
}
