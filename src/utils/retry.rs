//! Bounded retry around a single logical operation.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::adaptive_rate_limiter::RetryBackoff;
use crate::client::OperationExecutor;
use crate::config::MAX_ADVISED_WAIT;
use crate::error_handling::ErrorKind;
use crate::models::{OperationResult, TelemetrySample};
use crate::operations::GraphqlRequest;

/// Result of one logical operation plus every attempt it took.
///
/// The attempt log is applied to the controller by the scheduler after the
/// batch join, one sample per attempt.
#[derive(Debug, Clone)]
pub struct RetryOutcome {
    /// Final outcome of the operation
    pub result: OperationResult,
    /// Every attempt, in order
    pub attempts: Vec<TelemetrySample>,
}

/// Runs operations with up to `max_retries` retries each.
///
/// Cheap to clone; clones share the executor and cancellation token, so one
/// instance can be handed to every task of a batch.
#[derive(Clone)]
pub struct RetryExecutor {
    executor: Arc<dyn OperationExecutor>,
    backoff: RetryBackoff,
    max_retries: u32,
    cancel: CancellationToken,
}

impl RetryExecutor {
    /// Creates an executor sending requests through `client`.
    pub fn new(
        executor: Arc<dyn OperationExecutor>,
        backoff: RetryBackoff,
        max_retries: u32,
        cancel: CancellationToken,
    ) -> Self {
        RetryExecutor {
            executor,
            backoff,
            max_retries,
            cancel,
        }
    }

    /// Executes `request` until it succeeds, fails permanently, or runs out of retries.
    ///
    /// Only retriable failures are retried (see [`ErrorKind::is_retriable`]).
    /// Between attempts it waits `backoff.delay(attempt)`; a throttled attempt
    /// waits the server-advised `retry_after` instead when one was given,
    /// capped at [`MAX_ADVISED_WAIT`].
    /// Cancellation during a wait ends the operation as `ErrorKind::Cancelled`.
    ///
    /// Never fails: exhausted retries are reported with `retries_exhausted = true`.
    pub async fn execute(&self, request: &GraphqlRequest) -> RetryOutcome {
        let mut attempts: Vec<TelemetrySample> = Vec::with_capacity(1);
        let mut attempt: u32 = 0;

        loop {
            let sample = self.executor.execute(request).await;
            let success = sample.success;
            // Unclassified failures are treated as transient transport errors
            let kind = sample.error_kind.unwrap_or(ErrorKind::Network);
            let retry_after = sample.retry_after;
            attempts.push(sample);

            if success || !kind.is_retriable() {
                return finish(attempts, false, None);
            }
            if attempt >= self.max_retries {
                log::debug!("Giving up after {} attempt(s): {}", attempts.len(), kind);
                return finish(attempts, true, None);
            }

            let wait = match retry_after {
                Some(advised) if kind.is_throttle() => advised.min(MAX_ADVISED_WAIT),
                _ => self.backoff.delay(attempt),
            };
            log::debug!(
                "Attempt {} failed ({}), retrying in {:?}",
                attempt + 1,
                kind,
                wait
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return finish(attempts, false, Some(ErrorKind::Cancelled));
                }
                _ = tokio::time::sleep(wait) => {}
            }
            attempt += 1;
        }
    }
}

/// Folds the attempt log into the operation's result.
///
/// `override_kind` replaces the last attempt's error kind (cancellation).
fn finish(
    attempts: Vec<TelemetrySample>,
    retries_exhausted: bool,
    override_kind: Option<ErrorKind>,
) -> RetryOutcome {
    let cost: f64 = attempts.iter().map(|a| a.cost).sum();
    let last = attempts.last().cloned().unwrap_or_else(|| {
        TelemetrySample::failure(ErrorKind::Internal, "No attempt was made", Default::default())
    });

    let (error_kind, error_message) = if last.success {
        (None, None)
    } else {
        let kind = override_kind.or(last.error_kind).unwrap_or(ErrorKind::Network);
        let detail = last
            .error_message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| kind.as_str().to_string());
        let message = match override_kind {
            Some(ErrorKind::Cancelled) => format!("Cancelled while waiting to retry: {}", detail),
            _ => detail,
        };
        (Some(kind), Some(message))
    };

    RetryOutcome {
        result: OperationResult {
            success: last.success,
            cost,
            response_time_seconds: last.response_time.as_secs_f64(),
            error_kind,
            error_message,
            retries_exhausted,
            attempts: attempts.len() as u32,
            remote_id: last.remote_id.clone(),
        },
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::OperationKind;
    use crate::payload::Payload;
    use crate::test_helpers::{failed, ok_at_usage, ScriptedExecutor};
    use std::time::{Duration, Instant};

    fn request() -> GraphqlRequest {
        OperationKind::Delete.build_request(&Payload::Target("gid://shopify/Product/1".into()))
    }

    fn retry_with(
        executor: Arc<ScriptedExecutor>,
        max_retries: u32,
        cancel: CancellationToken,
    ) -> RetryExecutor {
        RetryExecutor::new(executor, RetryBackoff::new(1, 10), max_retries, cancel)
    }

    #[tokio::test]
    async fn test_transient_failures_exhaust_retries() {
        let executor = Arc::new(ScriptedExecutor::always(failed(ErrorKind::Network)));
        let retry = retry_with(executor.clone(), 3, CancellationToken::new());

        for _ in 0..10 {
            let outcome = retry.execute(&request()).await;
            assert!(!outcome.result.success);
            assert!(outcome.result.retries_exhausted);
            assert_eq!(outcome.result.attempts, 4);
            assert_eq!(outcome.attempts.len(), 4);
            assert_eq!(outcome.result.error_kind, Some(ErrorKind::Network));
            assert!(!outcome.result.error_message.unwrap().is_empty());
        }
        assert_eq!(executor.calls(), 10 * 4);
    }

    #[tokio::test]
    async fn test_success_after_failures_is_not_exhausted() {
        let mut second_failure = failed(ErrorKind::ServerError);
        second_failure.cost = 2.0;
        let executor = Arc::new(ScriptedExecutor::scripted(
            vec![failed(ErrorKind::Timeout), second_failure],
            ok_at_usage(10.0),
        ));
        let retry = retry_with(executor.clone(), 3, CancellationToken::new());

        let outcome = retry.execute(&request()).await;
        assert!(outcome.result.success);
        assert!(!outcome.result.retries_exhausted);
        assert_eq!(outcome.result.attempts, 3);
        assert_eq!(outcome.result.error_kind, None);
        assert_eq!(outcome.result.cost, 12.0);
        assert_eq!(outcome.result.response_time_seconds, 0.1);
        assert_eq!(outcome.attempts.len(), 3);
        assert_eq!(executor.calls(), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_makes_one_attempt() {
        let executor = Arc::new(ScriptedExecutor::always(failed(ErrorKind::Throttled)));
        let retry = retry_with(executor.clone(), 0, CancellationToken::new());

        let outcome = retry.execute(&request()).await;
        assert!(outcome.result.retries_exhausted);
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn test_user_error_is_not_retried() {
        let executor = Arc::new(ScriptedExecutor::always(failed(ErrorKind::UserError)));
        let retry = retry_with(executor.clone(), 3, CancellationToken::new());

        let outcome = retry.execute(&request()).await;
        assert!(!outcome.result.success);
        assert!(!outcome.result.retries_exhausted);
        assert_eq!(outcome.result.error_kind, Some(ErrorKind::UserError));
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn test_throttle_waits_server_advised_delay() {
        let throttled =
            failed(ErrorKind::Throttled).with_retry_after(Some(Duration::from_millis(60)));
        let executor = Arc::new(ScriptedExecutor::scripted(
            vec![throttled],
            ok_at_usage(20.0),
        ));
        let retry = retry_with(executor.clone(), 3, CancellationToken::new());

        let start = Instant::now();
        let outcome = retry.execute(&request()).await;
        assert!(outcome.result.success);
        assert!(start.elapsed() >= Duration::from_millis(60));
        assert_eq!(outcome.attempts[0].error_kind, Some(ErrorKind::Throttled));
    }

    #[tokio::test]
    async fn test_huge_advised_wait_is_interruptible() {
        let throttled = failed(ErrorKind::Throttled).with_retry_after(Some(Duration::MAX));
        let executor = Arc::new(ScriptedExecutor::always(throttled));
        let cancel = CancellationToken::new();
        let retry = retry_with(executor.clone(), 3, cancel.clone());

        let request = request();
        let execution = retry.execute(&request);
        tokio::pin!(execution);

        // Still waiting once the first attempt is in
        let early = tokio::time::timeout(Duration::from_millis(50), &mut execution).await;
        assert!(early.is_err());
        assert_eq!(executor.calls(), 1);

        cancel.cancel();
        let outcome = execution.await;
        assert_eq!(outcome.result.error_kind, Some(ErrorKind::Cancelled));
    }

    #[tokio::test]
    async fn test_cancellation_during_backoff() {
        let executor = Arc::new(ScriptedExecutor::always(failed(ErrorKind::Network)));
        let cancel = CancellationToken::new();
        let retry = RetryExecutor::new(
            executor.clone(),
            RetryBackoff::new(10_000, 60_000),
            3,
            cancel.clone(),
        );

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            cancel.cancel();
        });

        let start = Instant::now();
        let outcome = retry.execute(&request()).await;
        canceller.await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(outcome.result.error_kind, Some(ErrorKind::Cancelled));
        assert!(!outcome.result.retries_exhausted);
        assert!(outcome
            .result
            .error_message
            .unwrap()
            .starts_with("Cancelled while waiting to retry"));
        assert_eq!(executor.calls(), 1);
    }
}
