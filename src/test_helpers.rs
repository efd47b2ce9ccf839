//! Shared helpers for unit tests: scripted executors and sample builders.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::client::OperationExecutor;
use crate::error_handling::ErrorKind;
use crate::models::{RateLimitSnapshot, TelemetrySample};
use crate::operations::GraphqlRequest;

/// Executor that replays a script of samples, then repeats a fallback.
pub(crate) struct ScriptedExecutor {
    script: Mutex<VecDeque<TelemetrySample>>,
    fallback: TelemetrySample,
    calls: AtomicUsize,
    calibration_calls: AtomicUsize,
    calibration: TelemetrySample,
    latency: Duration,
}

impl ScriptedExecutor {
    pub(crate) fn always(sample: TelemetrySample) -> Self {
        Self::scripted(Vec::new(), sample)
    }

    pub(crate) fn scripted(script: Vec<TelemetrySample>, fallback: TelemetrySample) -> Self {
        ScriptedExecutor {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            calibration_calls: AtomicUsize::new(0),
            calibration: calibration_sample(1_000.0, 100.0),
            latency: Duration::ZERO,
        }
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Replaces the response to calibration queries.
    pub(crate) fn with_calibration(mut self, sample: TelemetrySample) -> Self {
        self.calibration = sample;
        self
    }

    /// Mutation attempts made, excluding calibration queries.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn calibration_calls(&self) -> usize {
        self.calibration_calls.load(Ordering::SeqCst)
    }

    fn next_sample(&self) -> TelemetrySample {
        let mut script = self.script.lock().unwrap();
        script.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

impl OperationExecutor for ScriptedExecutor {
    fn execute<'a>(&'a self, request: &'a GraphqlRequest) -> BoxFuture<'a, TelemetrySample> {
        Box::pin(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            if request.kind.is_none() {
                self.calibration_calls.fetch_add(1, Ordering::SeqCst);
                return self.calibration.clone();
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.next_sample()
        })
    }
}

/// Successful attempt at `usage_pct` of a 1000-point bucket leaking 50 pts/s.
pub(crate) fn ok_at_usage(usage_pct: f64) -> TelemetrySample {
    let capacity = 1_000.0;
    let available = capacity - capacity * usage_pct / 100.0;
    TelemetrySample::success(
        10.0,
        Some(RateLimitSnapshot::from_bucket(capacity, available, 50.0, 10.0)),
        Duration::from_millis(100),
        Some("gid://shopify/Product/1".to_string()),
    )
}

pub(crate) fn failed(kind: ErrorKind) -> TelemetrySample {
    TelemetrySample::failure(kind, format!("{} (scripted)", kind), Duration::from_millis(5))
}

pub(crate) fn calibration_sample(capacity: f64, leak_rate: f64) -> TelemetrySample {
    TelemetrySample::success(
        1.0,
        Some(RateLimitSnapshot::from_bucket(capacity, capacity - 1.0, leak_rate, 1.0)),
        Duration::from_millis(5),
        None,
    )
}
