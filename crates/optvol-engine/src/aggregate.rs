//! # Yearly Aggregation
//!
//! Reduces a year's payoff records into the summary row, and the yearly
//! rows into the study-level annualized gains.
//!
//! ## Description
//! Every mean is NaN-aware: undefined values (empty forward windows,
//! empty moneyness buckets) are excluded from numerator and count, never
//! zero-filled, and an empty input surfaces as NaN in the summary row.

use optvol_models::{Horizon, OptionType, Side, StudySummary, YearlySummary};

use crate::payoff::{PayoffRecord, RealizedMoneyness};

/// Mean over the non-NaN values; NaN when none remain.
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for value in values {
        if !value.is_nan() {
            sum += value;
            n += 1;
        }
    }
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Annualizes a mean per-horizon gain over the study period:
/// `(1 + mean)^(365/h) - 1`.
pub fn annualized_gain(yearly_mean_gains: impl IntoIterator<Item = f64>, horizon: Horizon) -> f64 {
    let mean = nan_mean(yearly_mean_gains);
    (1.0 + mean).powf(horizon.periods_per_year()) - 1.0
}

/// Per-type descriptive statistics over a year's payoff records.
struct TypeStats {
    implied_to_trailing: f64,
    implied_to_forward: f64,
    mean_gain: f64,
    in_money_ratio: f64,
    in_money_gain: f64,
    at_money_ratio: f64,
    out_money_ratio: f64,
    out_money_gain: f64,
}

impl TypeStats {
    /// # Parameters
    /// * `rows` - The year's payoff records of one option type.
    /// * `denominator` - Record count the bucket ratios divide by.
    fn compute(rows: &[&PayoffRecord], denominator: usize) -> Self {
        let ratio = |bucket: RealizedMoneyness| {
            let hits = rows
                .iter()
                .filter(|r| r.moneyness() == Some(bucket))
                .count();
            if denominator == 0 {
                f64::NAN
            } else {
                hits as f64 / denominator as f64
            }
        };
        let bucket_gain = |bucket: RealizedMoneyness| {
            nan_mean(
                rows.iter()
                    .filter(|r| r.moneyness() == Some(bucket))
                    .map(|r| r.pct_profit),
            )
        };

        // The summary column is implied/forward, stored as the inverse of
        // the mean forward/implied ratio (source convention).
        let forward_to_implied = nan_mean(
            rows.iter()
                .map(|r| r.record.forward_volatility / r.record.implied_volatility),
        );

        Self {
            implied_to_trailing: nan_mean(
                rows.iter()
                    .map(|r| r.record.implied_volatility / r.record.trailing_volatility),
            ),
            implied_to_forward: forward_to_implied.recip(),
            mean_gain: nan_mean(rows.iter().map(|r| r.pct_profit)),
            in_money_ratio: ratio(RealizedMoneyness::InMoney),
            in_money_gain: bucket_gain(RealizedMoneyness::InMoney),
            at_money_ratio: ratio(RealizedMoneyness::AtMoney),
            out_money_ratio: ratio(RealizedMoneyness::OutMoney),
            out_money_gain: bucket_gain(RealizedMoneyness::OutMoney),
        }
    }
}

/// Reduces one year's payoff records into its summary row.
pub fn aggregate_year(year: i32, payoffs: &[PayoffRecord]) -> YearlySummary {
    let calls: Vec<&PayoffRecord> = payoffs
        .iter()
        .filter(|r| r.record.option_type == OptionType::Call)
        .collect();
    let puts: Vec<&PayoffRecord> = payoffs
        .iter()
        .filter(|r| r.record.option_type == OptionType::Put)
        .collect();

    // Standardized tables quote call/put pairs; the call count serves as
    // the denominator for both types (source convention).
    let count = calls.len();
    let call_stats = TypeStats::compute(&calls, count);
    let put_stats = TypeStats::compute(&puts, count);

    YearlySummary {
        year,
        count,
        forward_to_trailing_vol: nan_mean(
            payoffs
                .iter()
                .map(|r| r.record.forward_volatility / r.record.trailing_volatility),
        ),
        call_implied_to_trailing_vol: call_stats.implied_to_trailing,
        call_implied_to_forward_vol: call_stats.implied_to_forward,
        call_mean_gain: call_stats.mean_gain,
        call_in_money_ratio: call_stats.in_money_ratio,
        call_in_money_gain: call_stats.in_money_gain,
        call_at_money_ratio: call_stats.at_money_ratio,
        call_out_money_ratio: call_stats.out_money_ratio,
        call_out_money_gain: call_stats.out_money_gain,
        put_implied_to_trailing_vol: put_stats.implied_to_trailing,
        put_implied_to_forward_vol: put_stats.implied_to_forward,
        put_mean_gain: put_stats.mean_gain,
        put_in_money_ratio: put_stats.in_money_ratio,
        put_in_money_gain: put_stats.in_money_gain,
        put_at_money_ratio: put_stats.at_money_ratio,
        put_out_money_ratio: put_stats.out_money_ratio,
        put_out_money_gain: put_stats.out_money_gain,
    }
}

/// Assembles the final study output from the completed yearly rows.
///
/// Years skipped for missing data are simply absent; no placeholder rows
/// are synthesized.
pub fn summarize_study(
    side: Side,
    horizon: Horizon,
    first_year: i32,
    last_year: i32,
    years: Vec<YearlySummary>,
) -> StudySummary {
    let call_annualized_gain = annualized_gain(years.iter().map(|y| y.call_mean_gain), horizon);
    let put_annualized_gain = annualized_gain(years.iter().map(|y| y.put_mean_gain), horizon);
    StudySummary {
        side,
        horizon,
        first_year,
        last_year,
        years,
        call_annualized_gain,
        put_annualized_gain,
    }
}
