//! Batch scheduling.
//!
//! This module turns "perform N operations of kind K" into a sequence of
//! concurrently executed batches:
//! - Calibrates the controller from one cheap query before the first batch
//! - Sizes each batch from the controller's current settings
//! - Runs a batch's operations on spawned tasks and waits for all of them
//! - Applies every attempt's telemetry to the controller after the join
//! - Sleeps the controller's delay between batches
//!
//! No operation of batch k+1 starts before batch k has settled, so the
//! controller always sizes a batch from complete telemetry.

mod dispatch;
mod types;

pub use types::RunOutcome;

use std::sync::Arc;
use std::time::Instant;

use tokio_retry::RetryIf;
use tokio_util::sync::CancellationToken;

use crate::adaptive_rate_limiter::RateLimitController;
use crate::app::{log_batch_progress, BatchProgress};
use crate::client::OperationExecutor;
use crate::config::ControllerConfig;
use crate::error_handling::{get_calibration_retry_strategy, BenchmarkError};
use crate::metrics::RateLimitStats;
use crate::models::TelemetrySample;
use crate::operations::{GraphqlRequest, OperationKind};
use crate::payload::PayloadProducer;
use crate::sink::{self, OutcomeSink};
use crate::utils::{RetryExecutor, RetryOutcome};

/// Drives one benchmark run at a time.
///
/// Owns the controller exclusively; worker tasks never touch it.
pub struct BatchScheduler {
    controller: RateLimitController,
    executor: Arc<dyn OperationExecutor>,
    sink: Arc<dyn OutcomeSink>,
    cancel: CancellationToken,
}

impl BatchScheduler {
    /// Creates a scheduler sending requests through `executor` and reporting to `sink`.
    pub fn new(
        config: ControllerConfig,
        executor: Arc<dyn OperationExecutor>,
        sink: Arc<dyn OutcomeSink>,
        cancel: CancellationToken,
    ) -> Self {
        BatchScheduler {
            controller: RateLimitController::new(config),
            executor,
            sink,
            cancel,
        }
    }

    /// The controller, for inspecting settings after a run.
    pub fn controller(&self) -> &RateLimitController {
        &self.controller
    }

    /// Runs `total` operations of `kind` with payloads from `producer`.
    ///
    /// Results come back in payload order, exactly one per attempted operation.
    /// A producer that runs dry ends the run early and the missing operations
    /// are reported as `shortfall`. Cancellation stops the loop before the
    /// next batch or during the inter-batch sleep; in-flight operations are
    /// always awaited.
    ///
    /// Any positive `total` is accepted; the CLI caps it at
    /// [`MAX_OPERATION_COUNT`](crate::config::MAX_OPERATION_COUNT).
    ///
    /// # Errors
    ///
    /// Returns `BenchmarkError` for a zero count or an invalid controller
    /// configuration, before any request is made.
    pub async fn run(
        &mut self,
        total: usize,
        producer: &mut dyn PayloadProducer,
        kind: OperationKind,
    ) -> Result<RunOutcome, BenchmarkError> {
        if total == 0 {
            return Err(BenchmarkError::InvalidCount(total));
        }
        self.controller
            .config()
            .validate()
            .map_err(BenchmarkError::InvalidControllerConfig)?;

        let start = Instant::now();
        self.controller.reset();
        let mut rate_limit = RateLimitStats::new(
            self.controller.config().high_usage_threshold_pct,
            self.controller.config().low_usage_threshold_pct,
        );
        let calibration_tier = self.calibrate(kind, &mut rate_limit).await;

        let retry = RetryExecutor::new(
            Arc::clone(&self.executor),
            self.controller.backoff(),
            self.controller.config().max_retries,
            self.cancel.clone(),
        );

        let mut results = Vec::with_capacity(total.min(crate::config::MAX_OPERATION_COUNT));
        let mut batch_sizes = Vec::new();
        let mut processed = 0usize;
        let mut shortfall = 0usize;
        let mut cancelled = false;

        while processed < total {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let settings = self.controller.current_settings();
            let wanted = settings.batch_size.min(total - processed);
            let mut payloads = producer.produce(kind, wanted);
            payloads.truncate(wanted);
            let attempted = payloads.len();

            if attempted > 0 {
                let outcomes = dispatch::run_batch(&retry, kind, payloads).await;
                let failures = self.apply_batch(outcomes, &mut results, &mut rate_limit);
                let successes = attempted - failures;

                if successes > failures.saturating_mul(2) {
                    self.controller.optimize_for_throughput();
                }

                batch_sizes.push(attempted);
                processed += attempted;
                log_batch_progress(
                    start,
                    &BatchProgress {
                        batch_number: batch_sizes.len(),
                        batch_size: attempted,
                        batch_failures: failures,
                        processed,
                        total,
                        next_settings: self.controller.current_settings(),
                    },
                );
            }

            if attempted < wanted {
                shortfall = total - processed;
                log::warn!(
                    "Payload source exhausted after {} of {} operation(s); {} not attempted",
                    processed,
                    total,
                    shortfall
                );
                break;
            }

            if processed < total {
                let delay = self.controller.current_settings().delay();
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        if cancelled {
            log::warn!(
                "Run cancelled after {} of {} operation(s)",
                processed,
                total
            );
        }

        results.truncate(total);
        Ok(RunOutcome {
            requested: total,
            results,
            elapsed: start.elapsed(),
            batch_sizes,
            shortfall,
            cancelled,
            rate_limit,
            final_settings: self.controller.current_settings(),
            calibration_tier,
            high_throughput_mode: self.controller.is_high_throughput_mode(),
        })
    }

    /// Reads the bucket once and seeds the controller from its leak rate.
    ///
    /// Falls back to the lowest tier when the query keeps failing or the run
    /// is cancelled meanwhile. The calibration sample feeds the statistics and
    /// the sink, not the controller's usage feedback.
    async fn calibrate(&mut self, kind: OperationKind, stats: &mut RateLimitStats) -> &'static str {
        let executor = self.executor.as_ref();
        let request = &GraphqlRequest::calibration();
        let attempt = RetryIf::spawn(
            get_calibration_retry_strategy(),
            || async move {
                let sample = executor.execute(request).await;
                if sample.success {
                    Ok(sample)
                } else {
                    Err(sample)
                }
            },
            |failure: &TelemetrySample| failure.error_kind.is_some_and(|k| k.is_retriable()),
        );

        let calibration = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = attempt => Some(result),
        };

        let leak_rate = match calibration {
            Some(Ok(sample)) => match sample.rate_limit {
                Some(snapshot) => {
                    stats.record(&snapshot);
                    sink::report_rate_limit_sample(self.sink.as_ref(), &snapshot);
                    snapshot.leak_rate_per_second
                }
                None => {
                    log::warn!("Calibration response carried no throttle status");
                    0.0
                }
            },
            Some(Err(failure)) => {
                log::warn!(
                    "Calibration query failed ({}), starting conservatively",
                    failure
                        .error_message
                        .as_deref()
                        .unwrap_or("unknown error")
                );
                0.0
            }
            None => 0.0,
        };

        self.controller
            .initialize_from_leak_rate(leak_rate, kind.estimated_cost())
    }

    /// Feeds a settled batch to the controller, statistics and sink.
    ///
    /// Returns the number of failed operations.
    fn apply_batch(
        &mut self,
        outcomes: Vec<RetryOutcome>,
        results: &mut Vec<crate::models::OperationResult>,
        stats: &mut RateLimitStats,
    ) -> usize {
        let mut failures = 0;
        for outcome in outcomes {
            for attempt in &outcome.attempts {
                self.controller.update_from_sample(attempt);
                if let Some(snapshot) = &attempt.rate_limit {
                    stats.record(snapshot);
                    sink::report_rate_limit_sample(self.sink.as_ref(), snapshot);
                }
            }
            if !outcome.result.success {
                failures += 1;
            }
            sink::report_outcome(self.sink.as_ref(), &outcome.result);
            results.push(outcome.result);
        }
        failures
    }
}
