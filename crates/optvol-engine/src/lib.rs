//! # Option Study Engine
//!
//! Core computation stages for the option profitability and
//! realized-volatility study.
//!
//! ## Description
//! Implements the per-record and per-year analytics that sit between the
//! materialized study tables and the summary output:
//! - **Window Index**: per-security, per-type date-sorted series with
//!   half-open range queries ([`window::TimeWindowIndex`]).
//! - **Volatility Windows**: trailing/forward realized volatility and the
//!   forward settlement price for a single record ([`volatility`]).
//! - **Enrichment**: batch driver applying the window computation across a
//!   year's records with progress reporting ([`enrich::RecordEnricher`]).
//! - **Payoff**: top-N market-cap universe selection and bounded
//!   buy/sell-side profit per record ([`payoff`]).
//! - **Aggregation**: NaN-aware per-year descriptive statistics and the
//!   study-level annualized gains ([`aggregate`]).
//!
//! The engine never holds a live data-source connection; every stage
//! consumes already-materialized tables and an immutable [`config::StudyConfig`].

pub mod aggregate;
pub mod config;
pub mod enrich;
pub mod payoff;
pub mod volatility;
pub mod window;

pub use aggregate::{aggregate_year, annualized_gain, nan_mean, summarize_study};
pub use config::{ConfigError, StudyConfig};
pub use enrich::RecordEnricher;
pub use payoff::{
    compute_payoffs, select_universe, universe_for_year, MarketCapSource, PayoffRecord,
    RealizedMoneyness, UniverseError,
};
pub use volatility::{compute_window_stats, WindowStats, TRADING_DAYS_PER_YEAR};
pub use window::TimeWindowIndex;
