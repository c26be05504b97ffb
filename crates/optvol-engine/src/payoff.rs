//! # Payoff Engine
//!
//! Top-N market-cap universe selection and bounded per-record profit
//! under the buy-side or sell-side convention.
//!
//! ## Description
//! For each study year, the universe is the top N securities by market
//! cap (price times shares outstanding) on the first trading day at or
//! after the year's reference date. Profit for each retained option
//! record is the realized payoff net of premium, clipped to the premium
//! bound of the chosen side: a buyer cannot lose more than the premium
//! paid and a writer cannot gain more than the premium received.
//!
//! Moneyness is classified on the sign of realized profit
//! ([`RealizedMoneyness`]). This is a named design choice of the study,
//! distinct from conventional intrinsic-value moneyness, and it changes
//! reported statistics relative to the strike/spot convention.

use std::collections::HashSet;

use chrono::NaiveDate;
use optvol_models::{EnrichedRecord, MarketCapRecord, OptionType, Side};
use tracing::info;

/// Calendar days the universe reference date may roll forward before the
/// year's selection fails.
pub const UNIVERSE_LOOKAHEAD_DAYS: i64 = 30;

/// No market-cap snapshot within the bounded lookahead. Fatal for that
/// year's universe only; other years proceed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("no market-cap snapshot within {lookahead} days of {reference} for year {year}")]
pub struct UniverseError {
    pub year: i32,
    pub reference: NaiveDate,
    pub lookahead: i64,
}

/// Supplier of per-security market-cap snapshots for a reference date.
///
/// An empty snapshot means the date had no observations (market closure
/// or missing calendar data), not an error.
pub trait MarketCapSource {
    fn snapshot(&self, date: NaiveDate) -> Vec<MarketCapRecord>;
}

/// Realized-payoff classification of a record.
///
/// `in-money` means profitable after premium, not in-the-money in the
/// strike/spot sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealizedMoneyness {
    InMoney,
    AtMoney,
    OutMoney,
}

impl RealizedMoneyness {
    /// Classifies a profit value; `None` when the profit is undefined.
    pub fn classify(profit: f64) -> Option<RealizedMoneyness> {
        if profit.is_nan() {
            None
        } else if profit > 0.0 {
            Some(RealizedMoneyness::InMoney)
        } else if profit < 0.0 {
            Some(RealizedMoneyness::OutMoney)
        } else {
            Some(RealizedMoneyness::AtMoney)
        }
    }
}

/// An enriched record with its side-adjusted profit.
#[derive(Debug, Clone)]
pub struct PayoffRecord {
    pub record: EnrichedRecord,
    /// Clipped signed profit; NaN when the settlement price is undefined.
    pub profit: f64,
    /// `profit / forward_price`.
    pub pct_profit: f64,
}

impl PayoffRecord {
    pub fn moneyness(&self) -> Option<RealizedMoneyness> {
        RealizedMoneyness::classify(self.profit)
    }
}

/// Ranks securities by market cap descending and returns the top `count`
/// identifiers.
///
/// Ties are broken by identifier ascending, so the selection is
/// deterministic and stable under re-sorting of the input.
pub fn select_universe(snapshots: &[MarketCapRecord], count: usize) -> HashSet<String> {
    let mut ranked: Vec<&MarketCapRecord> = snapshots.iter().collect();
    ranked.sort_by(|a, b| {
        b.market_cap()
            .total_cmp(&a.market_cap())
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    ranked
        .into_iter()
        .take(count)
        .map(|snap| snap.identifier.clone())
        .collect()
}

/// Selects the year's universe, rolling the reference date forward over
/// closures.
///
/// The reference date is Jan 1 of the study year. If that day has no
/// observations (a closure, or missing calendar data), the date advances
/// one calendar day at a time up to [`UNIVERSE_LOOKAHEAD_DAYS`]; running
/// out is a [`UniverseError`] for this year only.
pub fn universe_for_year(
    source: &dyn MarketCapSource,
    year: i32,
    count: usize,
) -> Result<HashSet<String>, UniverseError> {
    let reference = NaiveDate::from_ymd_opt(year, 1, 1).expect("valid calendar date");
    for offset in 0..=UNIVERSE_LOOKAHEAD_DAYS {
        let date = reference + chrono::Duration::days(offset);
        let snapshots = source.snapshot(date);
        if !snapshots.is_empty() {
            if offset > 0 {
                info!("universe reference date rolled to {} for year {}", date, year);
            }
            return Ok(select_universe(&snapshots, count));
        }
    }
    Err(UniverseError {
        year,
        reference,
        lookahead: UNIVERSE_LOOKAHEAD_DAYS,
    })
}

/// Computes side-adjusted payoffs for a year's enriched records.
///
/// Rows outside the universe are skipped, as are rows with a zero
/// trailing volatility (they would poison the volatility-ratio divisions
/// downstream). Rows with an undefined settlement price keep a NaN
/// profit and are excluded from every mean and ratio later.
pub fn compute_payoffs(
    records: &[EnrichedRecord],
    universe: &HashSet<String>,
    side: Side,
) -> Vec<PayoffRecord> {
    records
        .iter()
        .filter(|row| universe.contains(&row.identifier))
        .filter(|row| row.trailing_volatility != 0.0)
        .map(|row| {
            let profit = clipped_profit(row, side);
            PayoffRecord {
                record: row.clone(),
                profit,
                pct_profit: profit / row.forward_price,
            }
        })
        .collect()
}

/// Signed profit per the side convention, clipped to the premium bound.
///
/// Let K = forward price, R = realized settlement, p = premium:
/// - Buy call `R - K - p`, buy put `K - R - p`, floored at `-p`.
/// - Sell call `p + K - R`, sell put `p + R - K`, capped at `p`.
fn clipped_profit(row: &EnrichedRecord, side: Side) -> f64 {
    let k = row.forward_price;
    let r = row.forward_settlement_price;
    let p = row.premium;

    let raw = match (side, row.option_type) {
        (Side::Buy, OptionType::Call) => r - k - p,
        (Side::Buy, OptionType::Put) => k - r - p,
        (Side::Sell, OptionType::Call) => p + k - r,
        (Side::Sell, OptionType::Put) => p + r - k,
    };
    if raw.is_nan() {
        return f64::NAN;
    }
    match side {
        Side::Buy => raw.max(-p),
        Side::Sell => raw.min(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use optvol_models::OptionRecord;

    fn snapshot(identifier: &str, price: f64, shares: f64) -> MarketCapRecord {
        MarketCapRecord {
            identifier: identifier.to_string(),
            security_id: 1,
            close_price: price,
            shares_outstanding: shares,
        }
    }

    fn enriched(
        identifier: &str,
        option_type: OptionType,
        forward_price: f64,
        premium: f64,
        settlement: f64,
    ) -> EnrichedRecord {
        let raw = OptionRecord {
            security_id: 1,
            identifier: identifier.to_string(),
            date: NaiveDate::from_ymd_opt(2005, 6, 15).unwrap(),
            forward_price,
            premium,
            implied_volatility: 0.25,
            option_type,
            close_price: forward_price,
            daily_return: 0.004,
        };
        EnrichedRecord::new(raw, 0.22, 0.31, settlement)
    }

    struct FixedSource {
        open_from: NaiveDate,
        snapshots: Vec<MarketCapRecord>,
    }

    impl MarketCapSource for FixedSource {
        fn snapshot(&self, date: NaiveDate) -> Vec<MarketCapRecord> {
            if date >= self.open_from {
                self.snapshots.clone()
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn test_universe_ranks_by_market_cap() {
        let snaps = vec![
            snapshot("AAA00000", 10.0, 100.0), // 1_000
            snapshot("BBB00000", 50.0, 100.0), // 5_000
            snapshot("CCC00000", 20.0, 100.0), // 2_000
        ];
        let universe = select_universe(&snaps, 2);
        assert!(universe.contains("BBB00000"));
        assert!(universe.contains("CCC00000"));
        assert!(!universe.contains("AAA00000"));
    }

    #[test]
    fn test_universe_tie_break_is_deterministic() {
        let mut snaps = vec![
            snapshot("ZZZ00000", 10.0, 100.0),
            snapshot("AAA00000", 10.0, 100.0),
            snapshot("MMM00000", 10.0, 100.0),
        ];
        let first = select_universe(&snaps, 2);
        snaps.reverse();
        let second = select_universe(&snaps, 2);
        assert_eq!(first, second);
        assert!(first.contains("AAA00000"));
        assert!(first.contains("MMM00000"));
    }

    #[test]
    fn test_reference_date_rolls_forward() {
        let source = FixedSource {
            open_from: NaiveDate::from_ymd_opt(2005, 1, 3).unwrap(),
            snapshots: vec![snapshot("AAA00000", 10.0, 100.0)],
        };
        let universe = universe_for_year(&source, 2005, 100).unwrap();
        assert!(universe.contains("AAA00000"));
    }

    #[test]
    fn test_bounded_lookahead_fails_the_year() {
        let source = FixedSource {
            open_from: NaiveDate::from_ymd_opt(2005, 3, 1).unwrap(),
            snapshots: vec![snapshot("AAA00000", 10.0, 100.0)],
        };
        let err = universe_for_year(&source, 2005, 100).unwrap_err();
        assert_eq!(err.year, 2005);
        assert_eq!(err.lookahead, UNIVERSE_LOOKAHEAD_DAYS);
    }

    #[test]
    fn test_buy_call_loss_floored_at_premium() {
        // Raw profit 97 - 100 - 5 = -8, floored at -5.
        let rows = vec![enriched("AAA00000", OptionType::Call, 100.0, 5.0, 97.0)];
        let universe = HashSet::from(["AAA00000".to_string()]);
        let payoffs = compute_payoffs(&rows, &universe, Side::Buy);
        assert_eq!(payoffs.len(), 1);
        assert_eq!(payoffs[0].profit, -5.0);
        assert_eq!(payoffs[0].pct_profit, -0.05);
        assert_eq!(payoffs[0].moneyness(), Some(RealizedMoneyness::OutMoney));
    }

    #[test]
    fn test_sell_put_gain_capped_at_premium() {
        // Raw profit 2 + 53 - 50 = 5, capped at 2.
        let rows = vec![enriched("AAA00000", OptionType::Put, 50.0, 2.0, 53.0)];
        let universe = HashSet::from(["AAA00000".to_string()]);
        let payoffs = compute_payoffs(&rows, &universe, Side::Sell);
        assert_eq!(payoffs[0].profit, 2.0);
        assert_eq!(payoffs[0].pct_profit, 0.04);
        assert_eq!(payoffs[0].moneyness(), Some(RealizedMoneyness::InMoney));
    }

    #[test]
    fn test_buy_profit_never_below_negative_premium() {
        for settlement in [0.0, 50.0, 95.0, 100.0, 105.0, 200.0] {
            let rows = vec![enriched("AAA00000", OptionType::Call, 100.0, 5.0, settlement)];
            let universe = HashSet::from(["AAA00000".to_string()]);
            let payoffs = compute_payoffs(&rows, &universe, Side::Buy);
            assert!(payoffs[0].profit >= -5.0);
        }
    }

    #[test]
    fn test_sell_profit_never_above_premium() {
        for settlement in [0.0, 50.0, 95.0, 100.0, 105.0, 200.0] {
            let rows = vec![enriched("AAA00000", OptionType::Call, 100.0, 5.0, settlement)];
            let universe = HashSet::from(["AAA00000".to_string()]);
            let payoffs = compute_payoffs(&rows, &universe, Side::Sell);
            assert!(payoffs[0].profit <= 5.0);
        }
    }

    #[test]
    fn test_nan_settlement_keeps_nan_profit() {
        let rows = vec![enriched("AAA00000", OptionType::Call, 100.0, 5.0, f64::NAN)];
        let universe = HashSet::from(["AAA00000".to_string()]);
        let payoffs = compute_payoffs(&rows, &universe, Side::Buy);
        assert!(payoffs[0].profit.is_nan());
        assert_eq!(payoffs[0].moneyness(), None);
    }

    #[test]
    fn test_zero_trailing_volatility_rows_excluded() {
        let mut row = enriched("AAA00000", OptionType::Call, 100.0, 5.0, 110.0);
        row.trailing_volatility = 0.0;
        let universe = HashSet::from(["AAA00000".to_string()]);
        let payoffs = compute_payoffs(&[row], &universe, Side::Buy);
        assert!(payoffs.is_empty());
    }

    #[test]
    fn test_rows_outside_universe_excluded() {
        let rows = vec![enriched("AAA00000", OptionType::Call, 100.0, 5.0, 110.0)];
        let universe = HashSet::from(["BBB00000".to_string()]);
        let payoffs = compute_payoffs(&rows, &universe, Side::Buy);
        assert!(payoffs.is_empty());
    }
}
