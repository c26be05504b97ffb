//! # Record Enrichment
//!
//! Batch driver applying the volatility window computation across a
//! year's option records.
//!
//! ## Description
//! Records are independent given a shared immutable index, so processing
//! order carries no meaning and the batch is safe for data parallelism.
//! Progress is reported at a coarse grain (default every 1% of records)
//! with elapsed seconds. Records whose trailing window held no
//! observations are dropped before the batch is returned; records with an
//! empty forward window are retained with NaN fields and excluded from
//! statistics downstream.

use std::time::Instant;

use optvol_models::{EnrichedRecord, Horizon, OptionRecord};
use tracing::info;

use crate::volatility::compute_window_stats;
use crate::window::TimeWindowIndex;

/// Applies [`compute_window_stats`] to every record of a year's table.
pub struct RecordEnricher<'a> {
    index: &'a TimeWindowIndex,
    horizon: Horizon,
    progress_steps: usize,
}

impl<'a> RecordEnricher<'a> {
    /// # Parameters
    /// * `index` - The year's immutable window index.
    /// * `horizon` - Window width in calendar days.
    /// * `progress_steps` - Number of progress reports over the batch
    ///   (100 reports once per 1% of records).
    pub fn new(index: &'a TimeWindowIndex, horizon: Horizon, progress_steps: usize) -> Self {
        Self {
            index,
            horizon,
            progress_steps: progress_steps.max(1),
        }
    }

    /// Enriches a year's records, dropping rows with no trailing history.
    ///
    /// # Parameters
    /// * `records` - The study year's raw table, any order.
    /// * `year` - Study year, for progress log attribution only.
    pub fn enrich(&self, records: &[OptionRecord], year: i32) -> Vec<EnrichedRecord> {
        let started = Instant::now();
        let report_every = (records.len() / self.progress_steps).max(1);

        let mut enriched = Vec::with_capacity(records.len());
        for (processed, record) in records.iter().enumerate() {
            let stats = compute_window_stats(record, self.index, self.horizon);
            let row = EnrichedRecord::new(
                record.clone(),
                stats.trailing_volatility,
                stats.forward_volatility,
                stats.forward_settlement_price,
            );
            if row.has_history() {
                enriched.push(row);
            }

            let done = processed + 1;
            if done % report_every == 0 {
                info!(
                    "{}% completed after {} seconds for year {}",
                    done / report_every,
                    started.elapsed().as_secs(),
                    year
                );
            }
        }

        info!(
            "enrichment retained {} of {} records for year {}",
            enriched.len(),
            records.len(),
            year
        );
        enriched
    }
}
