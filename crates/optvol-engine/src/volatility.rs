//! # Volatility Window Computation
//!
//! Trailing and forward realized volatility and the forward settlement
//! price for a single option record.
//!
//! ## Description
//! Realized volatility is the annualized root-sum-of-squares estimator
//! over the unique daily returns observed inside a calendar-day window,
//! with no mean subtraction (daily returns are assumed near zero-mean):
//!
//! ```text
//! vol = sqrt(252 * sum(r_i^2) / n)
//! ```
//!
//! Only observed trading days count, so windows straddling weekends or
//! holidays are absorbed naturally: `n` reflects trading days, not
//! calendar days. An empty window yields NaN.

use optvol_models::{Horizon, OptionRecord};

use crate::window::TimeWindowIndex;

/// Annualization convention: trading days per year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// The three derived statistics for one record. Any field may be NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Realized volatility over `[date - horizon, date)`.
    pub trailing_volatility: f64,
    /// Realized volatility over `[date, date + horizon)`.
    pub forward_volatility: f64,
    /// Close of the last observation in `[date, date + horizon)`; NaN when
    /// the forward window is empty (settlement is meaningless without it).
    pub forward_settlement_price: f64,
}

/// Computes the window statistics for one record against a year's index.
pub fn compute_window_stats(
    record: &OptionRecord,
    index: &TimeWindowIndex,
    horizon: Horizon,
) -> WindowStats {
    let trailing_start = record.date - horizon.duration();
    let forward_end = record.date + horizon.duration();

    let trailing = index.observations_in_range(
        record.security_id,
        record.option_type,
        trailing_start,
        record.date,
    );
    let forward = index.observations_in_range(
        record.security_id,
        record.option_type,
        record.date,
        forward_end,
    );

    let forward_settlement_price = forward
        .last()
        .map(|obs| obs.close_price)
        .unwrap_or(f64::NAN);

    WindowStats {
        trailing_volatility: realized_volatility(trailing.iter().map(|obs| obs.daily_return)),
        forward_volatility: realized_volatility(forward.iter().map(|obs| obs.daily_return)),
        forward_settlement_price,
    }
}

/// Annualized root-sum-of-squares volatility over the unique values of a
/// return series.
///
/// The de-duplication collapses multiple intraday-identical rows before
/// summation. It is a deliberate, reproducible source convention, so the
/// estimate depends only on the set of distinct return values, not on
/// their multiplicity or order. Empty input yields NaN.
pub fn realized_volatility(returns: impl Iterator<Item = f64>) -> f64 {
    let mut unique: Vec<f64> = returns.collect();
    unique.sort_by(f64::total_cmp);
    unique.dedup();

    if unique.is_empty() {
        return f64::NAN;
    }
    let sum_squares: f64 = unique.iter().map(|r| r * r).sum();
    (sum_squares * TRADING_DAYS_PER_YEAR / unique.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use optvol_models::OptionType;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn record(security_id: i64, date: NaiveDate, close: f64, ret: f64) -> OptionRecord {
        OptionRecord {
            security_id,
            identifier: "03783310".to_string(),
            date,
            forward_price: 100.0,
            premium: 5.0,
            implied_volatility: 0.25,
            option_type: OptionType::Call,
            close_price: close,
            daily_return: ret,
        }
    }

    #[test]
    fn test_known_trailing_volatility_value() {
        // Unique returns {0.01, 0.02, -0.01}: vol = sqrt(252 * 0.0006 / 3).
        let vol = realized_volatility([0.01, 0.02, -0.01, 0.01, 0.02].into_iter());
        assert!((vol - 0.224499).abs() < 1e-6);
    }

    #[test]
    fn test_volatility_is_order_invariant() {
        let forward = realized_volatility([0.01, 0.02, -0.01].into_iter());
        let reversed = realized_volatility([-0.01, 0.02, 0.01].into_iter());
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_empty_series_is_nan() {
        assert!(realized_volatility(std::iter::empty::<f64>()).is_nan());
    }

    #[test]
    fn test_duplicates_collapse_before_summation() {
        let with_dupes = realized_volatility([0.01, 0.01, 0.01, 0.02].into_iter());
        let without = realized_volatility([0.01, 0.02].into_iter());
        assert_eq!(with_dupes, without);
    }

    #[test]
    fn test_window_stats_for_a_record() {
        let horizon = Horizon::resolve(30);
        let rows = vec![
            // Trailing window of the 2005-06-15 record.
            record(1, date(2005, 6, 1), 98.0, 0.01),
            record(1, date(2005, 6, 2), 99.0, 0.02),
            record(1, date(2005, 6, 3), 97.5, -0.01),
            // Quote date itself belongs to the forward window.
            record(1, date(2005, 6, 15), 99.5, 0.004),
            record(1, date(2005, 6, 20), 101.0, 0.015),
            // Past the forward window.
            record(1, date(2005, 7, 15), 104.0, 0.01),
        ];
        let index = TimeWindowIndex::build([rows.as_slice()], 2005, horizon);
        let target = record(1, date(2005, 6, 15), 99.5, 0.004);

        let stats = compute_window_stats(&target, &index, horizon);

        let expected_trailing = realized_volatility([0.01, 0.02, -0.01].into_iter());
        let expected_forward = realized_volatility([0.004, 0.015].into_iter());
        assert_eq!(stats.trailing_volatility, expected_trailing);
        assert_eq!(stats.forward_volatility, expected_forward);
        // Last close in [Jun 15, Jul 15).
        assert_eq!(stats.forward_settlement_price, 101.0);
    }

    #[test]
    fn test_empty_windows_yield_nan() {
        let horizon = Horizon::resolve(30);
        let index = TimeWindowIndex::build(std::iter::empty::<&[OptionRecord]>(), 2005, horizon);
        let target = record(1, date(2005, 6, 15), 99.5, 0.004);

        let stats = compute_window_stats(&target, &index, horizon);
        assert!(stats.trailing_volatility.is_nan());
        assert!(stats.forward_volatility.is_nan());
        assert!(stats.forward_settlement_price.is_nan());
    }
}
