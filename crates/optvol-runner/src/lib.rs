//! # Study Pipeline Orchestration
//!
//! Drives enrichment and analysis across the study period.
//!
//! ## Description
//! Per-year enrichment jobs are independent: each owns its own window
//! index built from read-only partitions, so they run as parallel
//! blocking tasks. A failed year is logged and does not abort its
//! siblings; completed years keep their persisted output, and reruns skip
//! any year whose enriched table already exists.

pub mod pipeline;

pub use pipeline::{analyse, analyse_year, enrich_all, enrich_year, report_summary, EnrichOutcome};
