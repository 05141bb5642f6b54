//! Cash-flow projection library
//!
//! This crate projects a bank balance forward day by day from a list of
//! recurring cash-flow rules and rolls the projection up into report buckets.
//! It supports:
//! - One-time, monthly, quarterly and yearly rules anchored on a calendar day,
//!   clamped to short months and leap years
//! - Spreading a payment evenly over a month, quarter or year
//! - Percentage escalation every N months or years
//! - Free-text category labels with exact per-category flow series
//! - An optional month-end sweep of surplus cash into a compounding investment
//! - Daily, weekly (ISO), monthly, quarterly and yearly buckets
//!
//! All money is `i64` minor units; nothing is rounded except where a rule
//! explicitly compounds.
//!
//! # Builder DSL
//!
//! ```ignore
//! use cashflow_core::config::{RuleBuilder, ScenarioBuilder};
//! use cashflow_core::{Resolution, bucketize, simulate};
//!
//! let config = ScenarioBuilder::new()
//!     .start(2024, 1, 1)
//!     .years(1)
//!     .rule(RuleBuilder::income("1200.00").on(1, 1, 2024).monthly())
//!     .build();
//!
//! let result = simulate(&config)?.expect("non-empty window");
//! let buckets = bucketize(&result, Resolution::Monthly);
//! assert_eq!(buckets.len(), 12);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod accumulator;
pub mod bucket;
pub mod compile;
pub mod date_math;
pub mod error;
pub mod escalation;
pub mod money;
pub mod occurrences;
pub mod simulation;
pub mod summary;
pub mod sweep;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use bucket::{
    Bucket, BucketKey, FlowBreakdown, InvestmentBuckets, Resolution, bucketize,
    bucketize_flow_by_category, bucketize_investment,
};
pub use config::{RuleBuilder, ScenarioBuilder, SimulationConfig, SortKey};
pub use error::{ConfigError, ParseResolutionError, RuleError};
pub use money::CurrencyTable;
pub use simulation::{simulate, simulate_with};
pub use summary::BalanceSummary;
