//! Sliding windows over recent telemetry.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::error_handling::ErrorKind;
use crate::models::RateLimitSnapshot;

/// Recent failures, bounded by age and count.
pub(crate) struct FailureWindow {
    failures: VecDeque<(Instant, ErrorKind)>,
    window_size: usize,
    window_duration: Duration,
}

impl FailureWindow {
    pub(crate) fn new(window_size: usize, window_duration: Duration) -> Self {
        FailureWindow {
            failures: VecDeque::with_capacity(window_size),
            window_size,
            window_duration,
        }
    }

    /// Records a failure observed now.
    pub(crate) fn record(&mut self, kind: ErrorKind) {
        self.record_at(Instant::now(), kind);
    }

    pub(crate) fn record_at(&mut self, now: Instant, kind: ErrorKind) {
        self.expire(now);
        self.failures.push_back((now, kind));

        while self.failures.len() > self.window_size {
            self.failures.pop_front();
        }
    }

    fn expire(&mut self, now: Instant) {
        while let Some(front) = self.failures.front() {
            if now.duration_since(front.0) > self.window_duration {
                self.failures.pop_front();
            } else {
                break;
            }
        }
    }

    /// Failures inside the time window as of `now`.
    pub(crate) fn count_at(&self, now: Instant) -> usize {
        self.failures
            .iter()
            .filter(|(time, _)| now.duration_since(*time) <= self.window_duration)
            .count()
    }

    pub(crate) fn count(&self) -> usize {
        self.count_at(Instant::now())
    }

    pub(crate) fn clear(&mut self) {
        self.failures.clear();
    }
}

/// The last `capacity` rate-limit snapshots.
pub(crate) struct SnapshotHistory {
    snapshots: VecDeque<RateLimitSnapshot>,
    capacity: usize,
}

impl SnapshotHistory {
    pub(crate) fn new(capacity: usize) -> Self {
        SnapshotHistory {
            snapshots: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn push(&mut self, snapshot: RateLimitSnapshot) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
    }

    /// Mean usage over snapshots with a known capacity.
    pub(crate) fn mean_usage_pct(&self) -> Option<f64> {
        let usages: Vec<f64> = self
            .snapshots
            .iter()
            .filter_map(RateLimitSnapshot::usage_pct)
            .collect();
        if usages.is_empty() {
            None
        } else {
            Some(usages.iter().sum::<f64>() / usages.len() as f64)
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.snapshots.clear();
    }
}
