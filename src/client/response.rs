//! GraphQL response parsing.
//!
//! Shopify reports query cost and bucket state under `extensions.cost`:
//!
//! ```json
//! {
//!   "data": { ... },
//!   "extensions": {
//!     "cost": {
//!       "requestedQueryCost": 10,
//!       "actualQueryCost": 10,
//!       "throttleStatus": {
//!         "maximumAvailable": 2000.0,
//!         "currentlyAvailable": 1990,
//!         "restoreRate": 100.0
//!       }
//!     }
//!   }
//! }
//! ```

use std::time::Duration;

use serde_json::Value;

use crate::error_handling::{advised_wait, ErrorKind};
use crate::models::{RateLimitSnapshot, TelemetrySample};
use crate::operations::OperationKind;

const THROTTLED_CODE: &str = "THROTTLED";

/// Cost figures read from `extensions.cost`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct QueryCost {
    requested: Option<f64>,
    actual: Option<f64>,
    snapshot: Option<RateLimitSnapshot>,
}

impl QueryCost {
    /// Points charged: actual if reported, else requested, else 0.
    fn charged(&self) -> f64 {
        self.actual.or(self.requested).unwrap_or(0.0)
    }
}

fn read_cost(body: &Value) -> QueryCost {
    let Some(cost) = body.pointer("/extensions/cost") else {
        return QueryCost::default();
    };
    let requested = cost.get("requestedQueryCost").and_then(Value::as_f64);
    let actual = cost.get("actualQueryCost").and_then(Value::as_f64);
    let charged = actual.or(requested).unwrap_or(0.0);

    let snapshot = cost.get("throttleStatus").and_then(|status| {
        let capacity = status.get("maximumAvailable").and_then(Value::as_f64)?;
        let available = status.get("currentlyAvailable").and_then(Value::as_f64)?;
        let restore = status
            .get("restoreRate")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        Some(RateLimitSnapshot::from_bucket(
            capacity, available, restore, charged,
        ))
    });

    QueryCost {
        requested,
        actual,
        snapshot,
    }
}

/// Time until the bucket holds `requested` points again, capped at
/// [`MAX_ADVISED_WAIT`](crate::config::MAX_ADVISED_WAIT).
fn throttle_wait(cost: &QueryCost) -> Option<Duration> {
    let snapshot = cost.snapshot?;
    let requested = cost.requested?;
    if snapshot.leak_rate_per_second <= 0.0 {
        return None;
    }
    let missing = (requested - snapshot.points_available).max(0.0);
    advised_wait(missing / snapshot.leak_rate_per_second)
}

fn error_messages(errors: &[Value]) -> String {
    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|e| e.get("message").and_then(Value::as_str))
        .collect();
    if messages.is_empty() {
        "GraphQL error".to_string()
    } else {
        messages.join("; ")
    }
}

/// Turns a successfully decoded GraphQL response body into a telemetry sample.
///
/// - Top-level `errors` with `extensions.code == "THROTTLED"` → `Throttled`,
///   with a retry-after derived from the missing points and the restore rate
/// - Any other top-level `errors` → `GraphqlError`
/// - Missing `data` or mutation root field → `MalformedResponse`
/// - Non-empty `userErrors` → `UserError`
///
/// The charged cost and bucket snapshot are attached to failures as well,
/// since failed operations still consume budget.
pub fn parse_response(
    body: &Value,
    kind: Option<OperationKind>,
    response_time: Duration,
) -> TelemetrySample {
    let cost = read_cost(body);
    let charged = cost.charged();

    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let throttled = errors.iter().any(|e| {
                e.pointer("/extensions/code").and_then(Value::as_str) == Some(THROTTLED_CODE)
            });
            let sample = if throttled {
                TelemetrySample::failure(ErrorKind::Throttled, error_messages(errors), response_time)
                    .with_retry_after(throttle_wait(&cost))
            } else {
                TelemetrySample::failure(
                    ErrorKind::GraphqlError,
                    error_messages(errors),
                    response_time,
                )
            };
            return sample.with_cost(charged).with_rate_limit(cost.snapshot);
        }
    }

    let Some(data) = body.get("data").filter(|d| !d.is_null()) else {
        return TelemetrySample::failure(
            ErrorKind::MalformedResponse,
            "Response has neither data nor errors",
            response_time,
        )
        .with_cost(charged)
        .with_rate_limit(cost.snapshot);
    };

    let Some(kind) = kind else {
        return TelemetrySample::success(charged, cost.snapshot, response_time, None);
    };

    if data.get(kind.root_field()).filter(|v| !v.is_null()).is_none() {
        return TelemetrySample::failure(
            ErrorKind::MalformedResponse,
            format!("Response is missing '{}'", kind.root_field()),
            response_time,
        )
        .with_cost(charged)
        .with_rate_limit(cost.snapshot);
    }

    match kind.interpret(data) {
        Ok(remote_id) => TelemetrySample::success(charged, cost.snapshot, response_time, remote_id),
        Err(message) => TelemetrySample::failure(ErrorKind::UserError, message, response_time)
            .with_cost(charged)
            .with_rate_limit(cost.snapshot),
    }
}
