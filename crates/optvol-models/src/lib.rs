//! # Option Study Data Model
//!
//! Shared record types for the option profitability and realized-volatility
//! study pipeline.
//!
//! ## Description
//! Defines the logical schema flowing between the pipeline stages:
//! - **Raw records**: standardized option quotes joined with the daily
//!   security price/return series ([`OptionRecord`]).
//! - **Enriched records**: raw records extended with trailing/forward
//!   realized volatility and the forward settlement price
//!   ([`EnrichedRecord`]).
//! - **Universe inputs**: per-security market-cap snapshots used to rank
//!   the yearly study universe ([`MarketCapRecord`]).
//! - **Outputs**: per-year descriptive statistics and the study-level
//!   annualized gains ([`YearlySummary`], [`StudySummary`]).

pub mod horizon;
pub mod record;
pub mod summary;

pub use horizon::Horizon;
pub use record::{EnrichedRecord, MarketCapRecord, OptionRecord, OptionType, Side};
pub use summary::{StudySummary, YearlySummary};
