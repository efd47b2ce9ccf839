//! shopify_bulk_bench library: adaptive bulk mutations against a leaky-bucket GraphQL API
//!
//! This library drives bulk product create/update/delete mutations against the
//! Shopify Admin GraphQL API as fast as its cost-based rate limit allows. A
//! multiplicative controller resizes batches and pacing from the bucket state
//! reported with every response, and each run ends with throughput metrics and
//! linear projections.
//!
//! # Example
//!
//! ```no_run
//! use shopify_bulk_bench::{run_benchmark, Config, OperationKind};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     shop: "example.myshopify.com".to_string(),
//!     access_token: "shpat_xxx".to_string(),
//!     operation: OperationKind::Create,
//!     count: 500,
//!     ..Default::default()
//! };
//!
//! let report = run_benchmark(config).await?;
//! println!("{} succeeded, {} failed in {:.1}s",
//!          report.summary.success_count, report.summary.failure_count, report.elapsed_seconds);
//! # Ok(())
//! # }
//! ```
//!
//! The pieces can also be driven directly: implement [`OperationExecutor`] for
//! another transport and hand it to a [`BatchScheduler`] with any
//! [`PayloadProducer`].
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod adaptive_rate_limiter;
mod app;
mod client;
pub mod config;
mod error_handling;
pub mod initialization;
mod metrics;
mod models;
mod operations;
mod payload;
mod run;
mod scheduler;
mod sink;
mod utils;

#[cfg(test)]
mod test_helpers;

// Re-export public API
pub use adaptive_rate_limiter::{ControllerSettings, RateLimitController, RetryBackoff};
pub use client::{parse_response, OperationExecutor, ShopifyClient};
pub use config::{Config, ControllerConfig, LogFormat, LogLevel};
pub use error_handling::{BenchmarkError, ErrorKind, InitializationError};
pub use metrics::{summarize, BenchmarkSummary, Projection, RateLimitStats};
pub use models::{OperationResult, RateLimitSnapshot, TelemetrySample};
pub use operations::{GraphqlRequest, OperationKind};
pub use payload::{ExistingIds, Payload, PayloadProducer, ProductInput, RandomProducts};
pub use run::{run_benchmark, BenchmarkReport};
pub use scheduler::{BatchScheduler, RunOutcome};
pub use sink::{LogSink, NullSink, OutcomeSink};
pub use utils::{RetryExecutor, RetryOutcome};
