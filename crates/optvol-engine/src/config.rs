//! # Study Configuration
//!
//! Validated, immutable configuration shared by every pipeline stage.
//!
//! ## Description
//! A [`StudyConfig`] is built once, before any computation starts, and then
//! passed by reference into each stage. Re-invoking the pipeline with a
//! different study period means building a fresh config; no stage keeps
//! mutable defaults between calls.

use optvol_models::Horizon;

/// Earliest usable study year. The vendor's option records start in 1996,
/// and a study year needs its prior year as trailing-window history.
pub const MIN_STUDY_YEAR: i32 = 1997;

/// Default number of securities in the yearly top-market-cap universe.
pub const DEFAULT_MARKET_CAP_COUNT: usize = 100;

/// Default number of progress reports per enrichment batch.
pub const DEFAULT_PROGRESS_STEPS: usize = 100;

/// Invalid study parameters. Fatal: raised before any computation starts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Vendor records start in 1996; the first usable study year is 1997.
    #[error("study period must start in {MIN_STUDY_YEAR} or later, got {0}")]
    StartsTooEarly(i32),
    /// A study year needs its following year as forward-window history.
    #[error("study period must end before {latest}, got {year}")]
    EndsTooLate { year: i32, latest: i32 },
    /// Last year precedes first year.
    #[error("study period {first}-{last} is empty")]
    EmptyPeriod { first: i32, last: i32 },
}

/// Immutable parameters of one study run.
#[derive(Debug, Clone)]
pub struct StudyConfig {
    first_year: i32,
    last_year: i32,
    horizon: Horizon,
    progress_steps: usize,
    market_cap_count: usize,
}

impl StudyConfig {
    /// Validates and builds a study configuration.
    ///
    /// # Parameters
    /// * `first_year` / `last_year` - Contiguous calendar-year range.
    /// * `horizon_days` - Days to maturity; snapped to the quoted tenor set.
    /// * `current_year` - "Now" for the future-year check (records finish
    ///   in `current_year - 2`, so every study year must be `< current_year - 1`).
    ///
    /// # Returns
    /// `Err(ConfigError)` on an invalid period; never panics.
    pub fn new(
        first_year: i32,
        last_year: i32,
        horizon_days: i64,
        current_year: i32,
    ) -> Result<Self, ConfigError> {
        if last_year < first_year {
            return Err(ConfigError::EmptyPeriod {
                first: first_year,
                last: last_year,
            });
        }
        if first_year < MIN_STUDY_YEAR {
            return Err(ConfigError::StartsTooEarly(first_year));
        }
        let latest = current_year - 1;
        if last_year >= latest {
            return Err(ConfigError::EndsTooLate {
                year: last_year,
                latest,
            });
        }
        Ok(Self {
            first_year,
            last_year,
            horizon: Horizon::resolve(horizon_days),
            progress_steps: DEFAULT_PROGRESS_STEPS,
            market_cap_count: DEFAULT_MARKET_CAP_COUNT,
        })
    }

    /// Overrides the number of progress reports per enrichment batch.
    pub fn with_progress_steps(mut self, steps: usize) -> Self {
        self.progress_steps = steps.max(1);
        self
    }

    /// Overrides the top-N universe size.
    pub fn with_market_cap_count(mut self, count: usize) -> Self {
        self.market_cap_count = count.max(1);
        self
    }

    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    pub fn last_year(&self) -> i32 {
        self.last_year
    }

    /// The study years, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.first_year..=self.last_year
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn progress_steps(&self) -> usize {
        self.progress_steps
    }

    pub fn market_cap_count(&self) -> usize {
        self.market_cap_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_period() {
        let config = StudyConfig::new(2001, 2019, 91, 2022).unwrap();
        assert_eq!(config.first_year(), 2001);
        assert_eq!(config.last_year(), 2019);
        assert_eq!(config.horizon().days(), 91);
        assert_eq!(config.years().count(), 19);
    }

    #[test]
    fn test_rejects_pre_1997_start() {
        let err = StudyConfig::new(1995, 2010, 91, 2022).unwrap_err();
        assert_eq!(err, ConfigError::StartsTooEarly(1995));
    }

    #[test]
    fn test_rejects_recent_years() {
        // Records finish in current_year - 2.
        let err = StudyConfig::new(2001, 2021, 91, 2022).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EndsTooLate {
                year: 2021,
                latest: 2021
            }
        );
    }

    #[test]
    fn test_rejects_inverted_period() {
        let err = StudyConfig::new(2010, 2005, 91, 2022).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyPeriod {
                first: 2010,
                last: 2005
            }
        );
    }

    #[test]
    fn test_out_of_set_horizon_snaps() {
        let config = StudyConfig::new(2001, 2010, 100, 2022).unwrap();
        assert_eq!(config.horizon().days(), 91);
    }
}
