//! # Contract Horizon
//!
//! Fixed vocabulary of standardized contract tenors and nearest-match
//! resolution for out-of-set inputs.

use serde::{Deserialize, Serialize};

/// Days to maturity of a standardized contract.
///
/// Only the tenors quoted by the vendor exist: 10, 30, 60, 91, 122, 152,
/// 182, 273, 365, 547 and 730 calendar days. [`Horizon::resolve`] folds
/// any other input onto the nearest quoted tenor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Horizon(u32);

/// The quoted contract tenors, in calendar days.
pub const HORIZON_CHOICES: [u32; 11] = [10, 30, 60, 91, 122, 152, 182, 273, 365, 547, 730];

impl Horizon {
    /// Resolves an arbitrary day count onto the quoted tenor set.
    ///
    /// Negative inputs are folded by absolute value, then snapped to the
    /// nearest quoted tenor (lower tenor wins a tie).
    pub fn resolve(days: i64) -> Horizon {
        let days = days.unsigned_abs().min(u32::MAX as u64) as u32;
        if HORIZON_CHOICES.contains(&days) {
            return Horizon(days);
        }
        let nearest = HORIZON_CHOICES
            .iter()
            .copied()
            .min_by_key(|choice| choice.abs_diff(days))
            .unwrap_or(HORIZON_CHOICES[0]);
        Horizon(nearest)
    }

    /// Calendar days to maturity.
    pub fn days(&self) -> u32 {
        self.0
    }

    /// Chrono duration covering the horizon.
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::days(self.0 as i64)
    }

    /// Exponent used for annualizing a mean per-horizon gain:
    /// `(1 + gain)^(365/h) - 1`.
    pub fn periods_per_year(&self) -> f64 {
        365.0 / self.0 as f64
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
