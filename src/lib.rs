//! Monthly aggregation and ranking for per-state COVID-19 daily series.
//!
//! [`aggregator`] holds the pure core; [`loader`] and [`pipeline`] turn a
//! `states/daily.json` export into CSV/JSON reports.
pub mod aggregator;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod regions;
pub mod reports;
pub mod types;
pub mod util;
