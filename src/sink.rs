//! Observability sinks for per-operation outcomes and bucket samples.

use crate::models::{OperationResult, RateLimitSnapshot};

/// Receives every operation outcome and every rate-limit sample of a run.
///
/// Calls are made from the scheduler's control task after each batch join, in
/// payload order. Errors are logged and ignored; a failing sink never affects
/// the run.
pub trait OutcomeSink: Send + Sync {
    /// Called once per finished operation.
    fn report_outcome(&self, result: &OperationResult) -> anyhow::Result<()>;

    /// Called for every bucket sample the controller records.
    fn report_rate_limit_sample(&self, snapshot: &RateLimitSnapshot) -> anyhow::Result<()>;
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutcomeSink for NullSink {
    fn report_outcome(&self, _result: &OperationResult) -> anyhow::Result<()> {
        Ok(())
    }

    fn report_rate_limit_sample(&self, _snapshot: &RateLimitSnapshot) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Writes outcomes to the `log` facade.
///
/// Failures go to `debug`, successes and bucket samples to `trace`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl OutcomeSink for LogSink {
    fn report_outcome(&self, result: &OperationResult) -> anyhow::Result<()> {
        if result.success {
            log::trace!(
                "Operation succeeded in {:.3}s (cost {:.1}, attempts {}, id {})",
                result.response_time_seconds,
                result.cost,
                result.attempts,
                result.remote_id.as_deref().unwrap_or("-")
            );
        } else {
            log::debug!(
                "Operation failed after {} attempt(s){}: {} - {}",
                result.attempts,
                if result.retries_exhausted {
                    " (retries exhausted)"
                } else {
                    ""
                },
                result.error_kind.map(|k| k.as_str()).unwrap_or("Unknown"),
                result.error_message.as_deref().unwrap_or("")
            );
        }
        Ok(())
    }

    fn report_rate_limit_sample(&self, snapshot: &RateLimitSnapshot) -> anyhow::Result<()> {
        log::trace!(
            "Bucket {:.0}/{:.0} used ({:.1}%), leak {:.0} pts/s",
            snapshot.points_used,
            snapshot.bucket_capacity,
            snapshot.usage_pct().unwrap_or(0.0),
            snapshot.leak_rate_per_second
        );
        Ok(())
    }
}

/// Forwards to `sink`, logging (never propagating) its errors.
pub(crate) fn report_outcome(sink: &dyn OutcomeSink, result: &OperationResult) {
    if let Err(e) = sink.report_outcome(result) {
        log::warn!("Outcome sink failed: {:#}", e);
    }
}

pub(crate) fn report_rate_limit_sample(sink: &dyn OutcomeSink, snapshot: &RateLimitSnapshot) {
    if let Err(e) = sink.report_rate_limit_sample(snapshot) {
        log::warn!("Rate-limit sink failed: {:#}", e);
    }
}
