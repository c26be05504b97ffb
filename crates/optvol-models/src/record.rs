//! # Record Types
//!
//! Row-level schema for the study tables.
//!
//! ## Description
//! The raw per-year tables carry one row per quoted standardized option per
//! trading day. The same rows double as the daily price/return series for
//! the volatility window lookups, since both are sourced from the same
//! joined table. Serde renames keep the CSV column names of the upstream
//! data vendor (`secid`, `cusip`, `cp_flag`, ...).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Classification of the option right: Call or Put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to buy.
    #[serde(rename = "C")]
    Call,
    /// Right to sell.
    #[serde(rename = "P")]
    Put,
}

impl OptionType {
    /// Single-letter flag used in the vendor tables.
    pub fn flag(&self) -> &'static str {
        match self {
            OptionType::Call => "C",
            OptionType::Put => "P",
        }
    }
}

/// Payoff convention under study: option buyer or option writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Lowercase label used in output file names and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

/// One quoted standardized option, joined with the security's close price
/// and close-to-close return on the quote date.
///
/// # Fields
/// * `security_id` - Vendor security identifier, key into the price series.
/// * `identifier` - 8-character exchange-traceable issue code.
/// * `date` - Quote date.
/// * `forward_price` - Forward price level implied by the quote.
/// * `premium` - Option premium (expected > 0).
/// * `implied_volatility` - Quoted implied volatility (expected >= 0).
/// * `option_type` - Call or Put.
/// * `close_price` - Security close on the quote date.
/// * `daily_return` - Close-to-close return on the quote date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRecord {
    #[serde(rename = "secid")]
    pub security_id: i64,
    #[serde(rename = "cusip")]
    pub identifier: String,
    pub date: NaiveDate,
    pub forward_price: f64,
    pub premium: f64,
    #[serde(rename = "impl_volatility")]
    pub implied_volatility: f64,
    #[serde(rename = "cp_flag")]
    pub option_type: OptionType,
    #[serde(rename = "close")]
    pub close_price: f64,
    #[serde(rename = "return")]
    pub daily_return: f64,
}

/// An [`OptionRecord`] extended with the three derived window statistics.
///
/// NaN encodes "undefined": an empty trailing window leaves
/// `trailing_volatility` NaN (the row fails [`has_history`] and is dropped
/// at enrichment); an empty forward window leaves `forward_volatility` and
/// `forward_settlement_price` NaN and the row is excluded from payoff
/// statistics downstream.
///
/// [`has_history`]: EnrichedRecord::has_history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(rename = "secid")]
    pub security_id: i64,
    #[serde(rename = "cusip")]
    pub identifier: String,
    pub date: NaiveDate,
    pub forward_price: f64,
    pub premium: f64,
    #[serde(rename = "impl_volatility")]
    pub implied_volatility: f64,
    #[serde(rename = "cp_flag")]
    pub option_type: OptionType,
    #[serde(rename = "close")]
    pub close_price: f64,
    #[serde(rename = "return")]
    pub daily_return: f64,
    /// Annualized realized volatility over `[date - horizon, date)`.
    #[serde(rename = "rv_d_hist")]
    pub trailing_volatility: f64,
    /// Annualized realized volatility over `[date, date + horizon)`.
    #[serde(rename = "rv_d_forward")]
    pub forward_volatility: f64,
    /// Close price of the last observation in `[date, date + horizon)`.
    #[serde(rename = "real_forward_price")]
    pub forward_settlement_price: f64,
}

impl EnrichedRecord {
    /// Combines a raw record with its computed window statistics.
    pub fn new(
        record: OptionRecord,
        trailing_volatility: f64,
        forward_volatility: f64,
        forward_settlement_price: f64,
    ) -> Self {
        Self {
            security_id: record.security_id,
            identifier: record.identifier,
            date: record.date,
            forward_price: record.forward_price,
            premium: record.premium,
            implied_volatility: record.implied_volatility,
            option_type: record.option_type,
            close_price: record.close_price,
            daily_return: record.daily_return,
            trailing_volatility,
            forward_volatility,
            forward_settlement_price,
        }
    }

    /// True when the trailing window contained at least one observation.
    pub fn has_history(&self) -> bool {
        !self.trailing_volatility.is_nan()
    }

    /// Drops the three derived columns, recovering the raw record.
    pub fn strip(&self) -> OptionRecord {
        OptionRecord {
            security_id: self.security_id,
            identifier: self.identifier.clone(),
            date: self.date,
            forward_price: self.forward_price,
            premium: self.premium,
            implied_volatility: self.implied_volatility,
            option_type: self.option_type,
            close_price: self.close_price,
            daily_return: self.daily_return,
        }
    }
}

/// Per-security price and shares outstanding on a universe reference date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCapRecord {
    #[serde(rename = "cusip")]
    pub identifier: String,
    #[serde(rename = "permno")]
    pub security_id: i64,
    #[serde(rename = "prc")]
    pub close_price: f64,
    #[serde(rename = "shrout")]
    pub shares_outstanding: f64,
}

impl MarketCapRecord {
    /// Price times shares outstanding, the universe ranking key.
    pub fn market_cap(&self) -> f64 {
        self.close_price * self.shares_outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> OptionRecord {
        OptionRecord {
            security_id: 5001,
            identifier: "03783310".to_string(),
            date: NaiveDate::from_ymd_opt(2005, 6, 15).unwrap(),
            forward_price: 100.0,
            premium: 5.0,
            implied_volatility: 0.25,
            option_type: OptionType::Call,
            close_price: 99.5,
            daily_return: 0.004,
        }
    }

    #[test]
    fn test_option_type_flag() {
        assert_eq!(OptionType::Call.flag(), "C");
        assert_eq!(OptionType::Put.flag(), "P");
    }

    #[test]
    fn test_enrich_then_strip_round_trip() {
        let raw = sample_record();
        let enriched = EnrichedRecord::new(raw.clone(), 0.22, 0.31, 101.25);
        assert_eq!(enriched.strip(), raw);
    }

    #[test]
    fn test_has_history_on_nan_trailing() {
        let enriched = EnrichedRecord::new(sample_record(), f64::NAN, 0.31, 101.25);
        assert!(!enriched.has_history());

        let enriched = EnrichedRecord::new(sample_record(), 0.0, f64::NAN, f64::NAN);
        assert!(enriched.has_history());
    }

    #[test]
    fn test_market_cap() {
        let snap = MarketCapRecord {
            identifier: "03783310".to_string(),
            security_id: 14593,
            close_price: 40.0,
            shares_outstanding: 820_000.0,
        };
        assert_eq!(snap.market_cap(), 32_800_000.0);
    }
}
