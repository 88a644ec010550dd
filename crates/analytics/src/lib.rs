//! # Market Statistics Engine
//!
//! This crate turns the price histories of a benchmark and a set of instruments
//! into comparative risk/return statistics: up- and down-market capture ratios,
//! beta, and the Sortino ratio.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O and no knowledge of where prices come from. It depends
//!   only on `core-types` for its inputs and `configuration` for its parameters.
//! - **Immutable Pipeline:** Prices are aligned once into a `PriceMatrix`, turned
//!   into a `ReturnMatrix` of growth ratios, and labelled by the benchmark's
//!   direction. Nothing downstream mutates these.
//! - **Scoped Failure:** Alignment and return failures abort the run. Any
//!   statistic that cannot be computed for an instrument is recorded as a
//!   `MetricError` in that cell only.
//!
//! ## Public API
//!
//! - `MarketStatsEngine`: runs the whole pipeline.
//! - `MarketStatistics`: the matrices and per-instrument `StatisticsRecord`s.
//! - `AnalyticsError` / `MetricError`: fatal and per-cell failures.

// Declare the modules that constitute this crate.
pub mod aligner;
pub mod beta;
pub mod capture;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod math;
pub mod matrix;
pub mod report;
pub mod returns;
pub mod sortino;

// Re-export the key components to create a clean, public-facing API.
pub use aligner::align;
pub use classifier::{MarketDirection, MarketPeriod, PeriodClassification};
pub use engine::{MarketStatistics, MarketStatsEngine};
pub use error::{AnalyticsError, MetricError};
pub use matrix::{PriceMatrix, PriceRow, ReturnMatrix, ReturnRow};
pub use report::{Metric, StatisticValue, StatisticsRecord};
pub use returns::compute_returns;
pub use sortino::SortinoPeriod;
