//! Run-time reporting
//!
//! Counters for the scheduler's periodic stdout report and the final run
//! summary.

mod stats;

pub use stats::{format_report, CrawlStats, StatsSnapshot};
