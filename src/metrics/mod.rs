//! Run metrics.
//!
//! This module provides:
//! - `summarize`, the pure reduction of operation results into a `BenchmarkSummary`
//! - `RateLimitStats`, a running summary of the bucket samples seen during a run

mod rate_limit;
mod summary;

pub use rate_limit::RateLimitStats;
pub use summary::{summarize, BenchmarkSummary, Projection};
