//! Benchmark run orchestration.
//!
//! Wires the configured client, payload producer, sink and scheduler together
//! for one run and reduces the outcome into a [`BenchmarkReport`].

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use tokio_util::sync::CancellationToken;

use crate::adaptive_rate_limiter::ControllerSettings;
use crate::app::{install_interrupt_handler, log_report, shutdown_gracefully};
use crate::client::ShopifyClient;
use crate::config::Config;
use crate::error_handling::BenchmarkError;
use crate::initialization::{graphql_endpoint, init_client};
use crate::metrics::{summarize, BenchmarkSummary, RateLimitStats};
use crate::operations::OperationKind;
use crate::payload::{ExistingIds, PayloadProducer, RandomProducts};
use crate::scheduler::BatchScheduler;
use crate::sink::LogSink;

/// Results of a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    /// Run identifier (format: `run_<timestamp_millis>`), also used as a product tag
    pub run_id: String,
    /// Kind of mutation performed
    pub operation: OperationKind,
    /// Throughput and error statistics
    pub summary: BenchmarkSummary,
    /// Bucket pressure observed during the run
    pub rate_limit: RateLimitStats,
    /// Operations asked for
    pub requested: usize,
    /// Operations actually attempted
    pub attempted: usize,
    /// Operations skipped because not enough target records existed
    pub shortfall: usize,
    /// The run was interrupted before all operations were attempted
    pub cancelled: bool,
    /// Batches dispatched
    pub batches: usize,
    /// Tier chosen by calibration
    pub calibration_tier: &'static str,
    /// Controller settings at the end of the run
    pub final_settings: ControllerSettings,
    /// Wall time of the run
    pub elapsed_seconds: f64,
}

/// Runs a benchmark with the provided configuration.
///
/// This is the main entry point for the library. It builds the HTTP client,
/// loads target ids for update/delete runs, runs the scheduler until the
/// requested count is attempted (or Ctrl-C), and logs the summary.
///
/// # Errors
///
/// This function will return an error if:
/// - The HTTP client or endpoint cannot be initialized
/// - Existing product ids cannot be loaded for an update/delete run
/// - The count or controller configuration is invalid
///
/// Failed operations are not errors; they are counted in the report.
///
/// # Example
///
/// ```no_run
/// use shopify_bulk_bench::{run_benchmark, Config, OperationKind};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config {
///     shop: "example.myshopify.com".to_string(),
///     access_token: "shpat_xxx".to_string(),
///     operation: OperationKind::Create,
///     count: 200,
///     ..Default::default()
/// };
/// let report = run_benchmark(config).await?;
/// println!("{} of {} succeeded", report.summary.success_count, report.attempted);
/// # Ok(())
/// # }
/// ```
pub async fn run_benchmark(config: Config) -> Result<BenchmarkReport> {
    if config.count == 0 {
        return Err(BenchmarkError::InvalidCount(config.count).into());
    }

    let http = init_client(&config).context("Failed to initialize HTTP client")?;
    let endpoint = graphql_endpoint(&config).context("Failed to resolve GraphQL endpoint")?;
    info!("Using GraphQL endpoint {}", endpoint);
    let client = Arc::new(ShopifyClient::new(
        http,
        endpoint,
        config.access_token.clone(),
    ));

    let run_id = format!("run_{}", Utc::now().timestamp_millis());
    info!(
        "Starting run {}: {} x {}",
        run_id, config.count, config.operation
    );

    let mut producer: Box<dyn PayloadProducer> = if config.operation.needs_existing_records() {
        let ids = client
            .fetch_product_ids(config.count)
            .await
            .map_err(|e| BenchmarkError::PayloadLoadError(format!("{:#}", e)))?;
        if ids.len() < config.count {
            log::warn!(
                "Only {} existing product(s) available for {} {} operation(s)",
                ids.len(),
                config.count,
                config.operation
            );
        }
        Box::new(ExistingIds::new(ids))
    } else {
        Box::new(RandomProducts::new(run_id.clone()))
    };

    let cancel = CancellationToken::new();
    let interrupt_handler = install_interrupt_handler(cancel.clone());

    let mut scheduler = BatchScheduler::new(
        config.controller.clone(),
        client,
        Arc::new(LogSink),
        cancel,
    );
    let outcome = scheduler
        .run(config.count, producer.as_mut(), config.operation)
        .await;

    shutdown_gracefully(interrupt_handler).await;
    let outcome = outcome?;

    let elapsed_seconds = outcome.elapsed.as_secs_f64();
    let report = BenchmarkReport {
        run_id,
        operation: config.operation,
        summary: summarize(&outcome.results, elapsed_seconds),
        attempted: outcome.attempted(),
        requested: outcome.requested,
        shortfall: outcome.shortfall,
        cancelled: outcome.cancelled,
        batches: outcome.batch_sizes.len(),
        calibration_tier: outcome.calibration_tier,
        final_settings: outcome.final_settings,
        rate_limit: outcome.rate_limit,
        elapsed_seconds,
    };

    log_report(&report);
    Ok(report)
}
