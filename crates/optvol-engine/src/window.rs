//! # Time Window Index
//!
//! Per-security, per-type date-sorted observation series with half-open
//! range queries.
//!
//! ## Description
//! Point-in-time window scans over an unindexed multi-year table are the
//! dominant cost of enrichment (millions of records, one trailing and one
//! forward scan each). The index is built once per study year from the
//! union of the prior, current and next yearly partitions, restricted to
//! the span any window can reach, and then serves every lookup with a
//! binary search over a sorted series.

use std::collections::HashMap;

use chrono::NaiveDate;
use optvol_models::{Horizon, OptionRecord, OptionType};

/// One daily price/return observation for a `(security, option type)` key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub close_price: f64,
    pub daily_return: f64,
}

/// Read-only range index over a study year's observation span.
///
/// Shared immutable across all per-record computations of a year; each
/// year's enrichment task owns its own index.
#[derive(Debug, Default)]
pub struct TimeWindowIndex {
    series: HashMap<(i64, OptionType), Vec<Observation>>,
}

impl TimeWindowIndex {
    /// Builds the index for `year` from adjacent yearly partitions.
    ///
    /// # Parameters
    /// * `partitions` - Raw tables for the prior, current and next year
    ///   (any order; only dates matter).
    /// * `year` - The study year.
    /// * `horizon` - Widest window the study will scan.
    ///
    /// Observations are restricted to
    /// `[Jan 1 year - horizon, Jan 1 (year+1) + horizon)`, the exact union
    /// of every trailing and forward window a record of `year` can open,
    /// and sorted by date within each key.
    pub fn build<'a, P>(partitions: P, year: i32, horizon: Horizon) -> Self
    where
        P: IntoIterator<Item = &'a [OptionRecord]>,
    {
        let year_start = jan_first(year);
        let year_end = jan_first(year + 1);
        let lower = year_start - horizon.duration();
        let upper = year_end + horizon.duration();

        let mut series: HashMap<(i64, OptionType), Vec<Observation>> = HashMap::new();
        for partition in partitions {
            for record in partition {
                if record.date < lower || record.date >= upper {
                    continue;
                }
                series
                    .entry((record.security_id, record.option_type))
                    .or_default()
                    .push(Observation {
                        date: record.date,
                        close_price: record.close_price,
                        daily_return: record.daily_return,
                    });
            }
        }
        for observations in series.values_mut() {
            observations.sort_by_key(|obs| obs.date);
        }
        Self { series }
    }

    /// Observations for a key with dates in the half-open range `[start, end)`.
    ///
    /// Returns an empty slice, never an error, when the key or range has no
    /// observations.
    pub fn observations_in_range(
        &self,
        security_id: i64,
        option_type: OptionType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> &[Observation] {
        let Some(observations) = self.series.get(&(security_id, option_type)) else {
            return &[];
        };
        let from = observations.partition_point(|obs| obs.date < start);
        let to = observations.partition_point(|obs| obs.date < end);
        &observations[from..to]
    }

    /// Number of `(security, option type)` series held.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

fn jan_first(year: i32) -> NaiveDate {
    // Jan 1 exists for every chrono-representable year.
    NaiveDate::from_ymd_opt(year, 1, 1).expect("valid calendar date")
}
