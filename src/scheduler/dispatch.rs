//! Concurrent execution of one batch.

use futures::stream::FuturesUnordered;
use futures::StreamExt;

use crate::models::OperationResult;
use crate::operations::OperationKind;
use crate::payload::Payload;
use crate::utils::{RetryExecutor, RetryOutcome};

/// Runs every payload of a batch on its own task and waits for all of them.
///
/// Outcomes are returned in payload order. A task that panics is reported as
/// an `ErrorKind::Internal` failure with no attempts.
pub(super) async fn run_batch(
    retry: &RetryExecutor,
    kind: OperationKind,
    payloads: Vec<Payload>,
) -> Vec<RetryOutcome> {
    let size = payloads.len();
    let mut tasks = FuturesUnordered::new();

    for (index, payload) in payloads.into_iter().enumerate() {
        let retry = retry.clone();
        let request = kind.build_request(&payload);
        let handle = tokio::spawn(async move { retry.execute(&request).await });
        tasks.push(async move { (index, handle.await) });
    }

    let mut slots: Vec<Option<RetryOutcome>> = (0..size).map(|_| None).collect();
    while let Some((index, joined)) = tasks.next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(join_error) => {
                log::warn!("Operation task failed: {:?}", join_error);
                task_failure(format!("Operation task failed: {}", join_error))
            }
        };
        slots[index] = Some(outcome);
    }

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| task_failure("Operation task never reported")))
        .collect()
}

fn task_failure(message: impl Into<String>) -> RetryOutcome {
    RetryOutcome {
        result: OperationResult::internal_failure(message),
        attempts: Vec::new(),
    }
}
