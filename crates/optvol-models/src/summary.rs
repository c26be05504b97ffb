//! # Study Summary Types
//!
//! Per-year descriptive statistics and the study-level annualized gains.

use serde::{Deserialize, Serialize};

use crate::{Horizon, Side};

/// One row of the yearly summary table for a chosen side and horizon.
///
/// Ratios of volatilities are means over the year's retained records;
/// gains are means of per-record percentage profit. A NaN value means the
/// underlying bucket was empty for the year (never coerced to zero).
///
/// Moneyness here is the realized-payoff classification (`profit > 0` is
/// in-money), not conventional strike/spot moneyness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: i32,
    /// Records per option type. Standardized tables quote call/put pairs,
    /// so the call count serves both types.
    pub count: usize,
    /// Mean of forward/trailing realized volatility across both types.
    pub forward_to_trailing_vol: f64,

    pub call_implied_to_trailing_vol: f64,
    pub call_implied_to_forward_vol: f64,
    pub call_mean_gain: f64,
    pub call_in_money_ratio: f64,
    pub call_in_money_gain: f64,
    pub call_at_money_ratio: f64,
    pub call_out_money_ratio: f64,
    pub call_out_money_gain: f64,

    pub put_implied_to_trailing_vol: f64,
    pub put_implied_to_forward_vol: f64,
    pub put_mean_gain: f64,
    pub put_in_money_ratio: f64,
    pub put_in_money_gain: f64,
    pub put_at_money_ratio: f64,
    pub put_out_money_ratio: f64,
    pub put_out_money_gain: f64,
}

/// Final output of a study run: the yearly rows plus the two annualized
/// mean gains over the whole period, `(1 + mean gain)^(365/h) - 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySummary {
    pub side: Side,
    pub horizon: Horizon,
    pub first_year: i32,
    pub last_year: i32,
    pub years: Vec<YearlySummary>,
    pub call_annualized_gain: f64,
    pub put_annualized_gain: f64,
}
