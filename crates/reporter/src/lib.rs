//! # Reporter
//!
//! Presents the output of a statistics run: `comfy-table` tables for the
//! terminal, and CSV plus JSON files for everything else.
//!
//! ## Public API
//!
//! - `statistics_table`, `price_table`, `return_table`: terminal rendering.
//! - `Exporter`: writes the report files named after a `ReportContext`.

pub mod error;
pub mod export;
pub mod tables;

pub use error::ReportError;
pub use export::{
    DatedSortinoPeriod, Exporter, ReportContext, SortinoDetail, write_prices_csv,
    write_returns_csv, write_sortino_csv, write_statistics_csv,
};
pub use tables::{price_table, return_table, statistics_table};
