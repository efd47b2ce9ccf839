//! Telemetry and result records passed between the executor, controller and metrics.

use std::time::Duration;

use crate::error_handling::ErrorKind;

/// State of the remote leaky bucket as reported with one response.
///
/// Always satisfies `points_available == bucket_capacity - points_used` with all
/// three values non-negative; raw server values are clamped into that shape by
/// [`RateLimitSnapshot::from_bucket`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitSnapshot {
    /// `bucket_capacity - points_available`
    pub points_used: f64,
    /// Bucket size in points
    pub bucket_capacity: f64,
    /// Points free right now
    pub points_available: f64,
    /// Points restored per second
    pub leak_rate_per_second: f64,
    /// Points charged for the request that reported this state
    pub cost_of_last_operation: f64,
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl RateLimitSnapshot {
    /// Builds a snapshot from the capacity and currently available points.
    pub fn from_bucket(
        bucket_capacity: f64,
        points_available: f64,
        leak_rate_per_second: f64,
        cost_of_last_operation: f64,
    ) -> Self {
        let bucket_capacity = non_negative(bucket_capacity);
        let points_available = non_negative(points_available).min(bucket_capacity);
        RateLimitSnapshot {
            points_used: bucket_capacity - points_available,
            bucket_capacity,
            points_available,
            leak_rate_per_second: non_negative(leak_rate_per_second),
            cost_of_last_operation: non_negative(cost_of_last_operation),
        }
    }

    /// Bucket occupancy as a percentage, or `None` when the capacity is unknown.
    pub fn usage_pct(&self) -> Option<f64> {
        if self.bucket_capacity > 0.0 {
            Some(self.points_used * 100.0 / self.bucket_capacity)
        } else {
            None
        }
    }
}

/// Outcome of a single request attempt, as returned by an
/// [`OperationExecutor`](crate::OperationExecutor).
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    /// The attempt succeeded
    pub success: bool,
    /// Points charged for this attempt
    pub cost: f64,
    /// Bucket state reported with the response, if any
    pub rate_limit: Option<RateLimitSnapshot>,
    /// Wall time of the round trip
    pub response_time: Duration,
    /// Set when the attempt failed
    pub error_kind: Option<ErrorKind>,
    /// Set when the attempt failed
    pub error_message: Option<String>,
    /// Server-advised wait before retrying
    pub retry_after: Option<Duration>,
    /// Identifier of the created/updated/deleted record
    pub remote_id: Option<String>,
}

impl TelemetrySample {
    /// A successful attempt.
    pub fn success(
        cost: f64,
        rate_limit: Option<RateLimitSnapshot>,
        response_time: Duration,
        remote_id: Option<String>,
    ) -> Self {
        TelemetrySample {
            success: true,
            cost,
            rate_limit,
            response_time,
            error_kind: None,
            error_message: None,
            retry_after: None,
            remote_id,
        }
    }

    /// A failed attempt.
    pub fn failure(kind: ErrorKind, message: impl Into<String>, response_time: Duration) -> Self {
        TelemetrySample {
            success: false,
            cost: 0.0,
            rate_limit: None,
            response_time,
            error_kind: Some(kind),
            error_message: Some(message.into()),
            retry_after: None,
            remote_id: None,
        }
    }

    /// Overrides the charged cost.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Attaches the bucket state reported with the response.
    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimitSnapshot>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Attaches a server-advised wait.
    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }
}

/// Final outcome of one logical operation after all retries settled.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    /// The final attempt succeeded
    pub success: bool,
    /// Points charged across every attempt
    pub cost: f64,
    /// Response time of the final attempt
    pub response_time_seconds: f64,
    /// Kind of the final failure
    pub error_kind: Option<ErrorKind>,
    /// Message of the final failure
    pub error_message: Option<String>,
    /// All `max_retries + 1` attempts failed
    pub retries_exhausted: bool,
    /// Attempts made, including the first
    pub attempts: u32,
    /// Identifier returned by the successful attempt
    pub remote_id: Option<String>,
}

impl OperationResult {
    /// Result for an operation whose worker task never returned.
    pub(crate) fn internal_failure(message: impl Into<String>) -> Self {
        OperationResult {
            success: false,
            cost: 0.0,
            response_time_seconds: 0.0,
            error_kind: Some(ErrorKind::Internal),
            error_message: Some(message.into()),
            retries_exhausted: false,
            attempts: 0,
            remote_id: None,
        }
    }
}
