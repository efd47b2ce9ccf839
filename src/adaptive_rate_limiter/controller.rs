//! Rate-limit controller implementation.

use std::time::Duration;

use super::window::{FailureWindow, SnapshotHistory};
use crate::config::ControllerConfig;
use crate::error_handling::ErrorKind;
use crate::models::TelemetrySample;

/// Batch size and inter-batch delay recommended for the next batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Operations to dispatch in the next batch
    pub batch_size: usize,
    /// Pause before the next batch, in milliseconds
    pub delay_ms: u64,
}

impl ControllerSettings {
    /// The delay as a `Duration`.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Exponential retry backoff: `base * 2^attempt`, capped.
///
/// Detached from the controller so worker tasks can compute delays without
/// touching controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBackoff {
    base_ms: u64,
    max_ms: u64,
}

impl RetryBackoff {
    /// Backoff of `base_ms * 2^attempt`, never above `max_ms`.
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Delay before the retry that follows attempt `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let multiplier = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_ms.saturating_mul(multiplier).min(self.max_ms))
    }
}

/// Proportional feedback controller for batch size and pacing.
///
/// Reads bucket usage from each attempt's telemetry and scales the batch size
/// and delay multiplicatively per usage band:
/// - usage > 90%: batch ×0.85, delay ×1.2
/// - usage in (75%, 90%]: batch ×0.9, delay ×1.1
/// - usage in [50%, 75%]: hold
/// - usage in [30%, 50%): batch ×1.3, delay ×0.7
/// - usage < 30%: batch ×1.5, delay ×0.5
///
/// Bands and factors come from [`ControllerConfig`]. More than
/// `failure_threshold` failures inside `failure_window` force a slowdown on top.
/// Batch size stays in `[1, max_batch_size]` and delay in
/// `[min_delay_ms, max_delay_ms]` after every call.
pub struct RateLimitController {
    config: ControllerConfig,
    batch_size: usize,
    delay_ms: u64,
    high_throughput_mode: bool,
    history: SnapshotHistory,
    failures: FailureWindow,
}

impl RateLimitController {
    /// Creates a controller at its reset defaults.
    pub fn new(config: ControllerConfig) -> Self {
        let history = SnapshotHistory::new(config.history_window);
        let failures = FailureWindow::new(
            config.failure_threshold.saturating_mul(4).max(16),
            config.failure_window,
        );
        let mut controller = RateLimitController {
            config,
            batch_size: 1,
            delay_ms: 0,
            high_throughput_mode: false,
            history,
            failures,
        };
        controller.reset();
        controller
    }

    /// Tuning this controller was built with.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Returns to the aggressive defaults and forgets all history.
    pub fn reset(&mut self) {
        self.batch_size = self.clamp_batch(self.config.default_batch_size);
        self.delay_ms = self.clamp_delay(self.config.default_delay_ms);
        self.high_throughput_mode = false;
        self.history.clear();
        self.failures.clear();
    }

    /// Picks starting settings from the detected leak rate.
    ///
    /// The first tier whose `min_leak_rate` the leak rate reaches wins; an
    /// unknown (non-positive or non-finite) leak rate falls through to the last
    /// tier. With a known leak rate the tier's batch size is capped by the
    /// operations the leak rate sustains per second. Returns the tier name.
    pub fn initialize_from_leak_rate(
        &mut self,
        leak_rate_per_second: f64,
        cost_per_operation: f64,
    ) -> &'static str {
        let leak_rate = if leak_rate_per_second.is_finite() && leak_rate_per_second > 0.0 {
            leak_rate_per_second
        } else {
            0.0
        };
        let cost = if cost_per_operation.is_finite() && cost_per_operation > 0.0 {
            cost_per_operation
        } else {
            1.0
        };

        let tier = self
            .config
            .tiers
            .iter()
            .find(|tier| leak_rate > 0.0 && leak_rate >= tier.min_leak_rate)
            .or_else(|| self.config.tiers.last());
        let Some(tier) = tier else {
            return "default";
        };
        let (name, tier_batch, tier_delay) = (tier.name, tier.batch_size, tier.delay_ms);

        let batch = if leak_rate > 0.0 {
            let sustainable = ((leak_rate / cost).floor() as usize).max(1);
            tier_batch.min(sustainable)
        } else {
            tier_batch
        };
        self.batch_size = self.clamp_batch(batch);
        self.delay_ms = self.clamp_delay(tier_delay);

        if leak_rate >= self.config.high_throughput_leak_rate {
            self.high_throughput_mode = true;
        }

        log::info!(
            "Calibrated from leak rate {:.1} pts/s (cost {:.1}/op): {} tier, batch size {}, delay {}ms",
            leak_rate,
            cost,
            name,
            self.batch_size,
            self.delay_ms
        );
        name
    }

    /// Applies one attempt's telemetry.
    ///
    /// Usage comes from the sample's snapshot; a throttled attempt without one
    /// counts as a full bucket. Snapshots with unknown capacity only update the
    /// history. Failed attempts also go through [`record_failure`](Self::record_failure).
    pub fn update_from_sample(&mut self, sample: &TelemetrySample) {
        let throttled = sample.error_kind.is_some_and(|kind| kind.is_throttle());

        let mut usage = None;
        if let Some(snapshot) = sample.rate_limit {
            if snapshot.leak_rate_per_second >= self.config.high_throughput_leak_rate
                && !self.high_throughput_mode
            {
                log::info!(
                    "Leak rate {:.0} pts/s detected, switching to high-throughput mode",
                    snapshot.leak_rate_per_second
                );
                self.high_throughput_mode = true;
            }
            self.history.push(snapshot);
            usage = snapshot.usage_pct();
        }
        if usage.is_none() && throttled {
            usage = Some(100.0);
        }

        if let Some(usage) = usage {
            self.apply_usage(usage);
        }

        if !sample.success {
            if let Some(kind) = sample.error_kind {
                self.record_failure(kind);
            }
        }
    }

    /// Records a failure in the rolling window.
    ///
    /// Once more than `failure_threshold` failures are inside the window, the
    /// batch and delay factors for failures are applied and the window is cleared.
    /// User errors and cancellations say nothing about remote pressure and are
    /// not counted.
    pub fn record_failure(&mut self, kind: ErrorKind) {
        if matches!(kind, ErrorKind::UserError | ErrorKind::Cancelled) {
            return;
        }
        self.failures.record(kind);

        let recent = self.failures.count();
        if recent > self.config.failure_threshold {
            let factors = self.config.factors;
            let (old_batch, old_delay) = (self.batch_size, self.delay_ms);
            self.batch_size = self.clamp_batch(shrink(self.batch_size, factors.failure_batch));
            self.delay_ms = self.clamp_delay(grow_delay(self.delay_ms, factors.failure_delay));
            self.failures.clear();
            log::warn!(
                "{} failures within {:?}, slowing down: batch size {} → {}, delay {}ms → {}ms",
                recent,
                self.config.failure_window,
                old_batch,
                self.batch_size,
                old_delay,
                self.delay_ms
            );
        }
    }

    /// Pushes harder when recent usage leaves room.
    ///
    /// Only acts when the mean usage over the history window is below
    /// `optimize_usage_ceiling_pct` (no history counts as idle). The batch
    /// increment doubles in high-throughput mode. Returns whether settings changed.
    pub fn optimize_for_throughput(&mut self) -> bool {
        let usage = self.history.mean_usage_pct().unwrap_or(0.0);
        if usage >= self.config.optimize_usage_ceiling_pct {
            return false;
        }

        let increment = if self.high_throughput_mode {
            self.config.optimize_batch_increment.saturating_mul(2)
        } else {
            self.config.optimize_batch_increment
        };
        let old = self.current_settings();
        self.batch_size = self.clamp_batch(self.batch_size.saturating_add(increment));
        self.delay_ms =
            self.clamp_delay(self.delay_ms.saturating_sub(self.config.optimize_delay_decrement_ms));

        let new = self.current_settings();
        if new != old {
            log::debug!(
                "Throughput nudge at {:.1}% usage: batch size {} → {}, delay {}ms → {}ms",
                usage,
                old.batch_size,
                new.batch_size,
                old.delay_ms,
                new.delay_ms
            );
        }
        new != old
    }

    /// Settings for the next batch.
    pub fn current_settings(&self) -> ControllerSettings {
        ControllerSettings {
            batch_size: self.batch_size,
            delay_ms: self.delay_ms,
        }
    }

    /// Backoff before retrying after attempt `attempt` (0-based).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.backoff().delay(attempt)
    }

    /// Detached copy of the retry backoff, for worker tasks.
    pub fn backoff(&self) -> RetryBackoff {
        RetryBackoff::new(self.config.base_retry_delay_ms, self.config.max_delay_ms)
    }

    /// Whether a leak rate at or above `high_throughput_leak_rate` has been seen since the last reset.
    pub fn is_high_throughput_mode(&self) -> bool {
        self.high_throughput_mode
    }

    /// Mean usage over the history window, if any snapshot had a known capacity.
    pub fn recent_usage_pct(&self) -> Option<f64> {
        self.history.mean_usage_pct()
    }

    fn apply_usage(&mut self, usage: f64) {
        let bands = self.config.bands;
        let factors = self.config.factors;
        let (old_batch, old_delay) = (self.batch_size, self.delay_ms);

        let (batch, delay) = if usage > bands.critical {
            (
                self.shrink_floored(old_batch, factors.critical_batch),
                grow_delay(old_delay, factors.critical_delay),
            )
        } else if usage > bands.elevated {
            (
                self.shrink_floored(old_batch, factors.elevated_batch),
                grow_delay(old_delay, factors.elevated_delay),
            )
        } else if usage >= bands.steady {
            (old_batch, old_delay)
        } else if usage >= bands.idle {
            (
                grow(old_batch, factors.headroom_batch),
                shrink_delay(old_delay, factors.headroom_delay),
            )
        } else {
            (
                grow(old_batch, factors.idle_batch),
                shrink_delay(old_delay, factors.idle_delay),
            )
        };

        self.batch_size = self.clamp_batch(batch);
        self.delay_ms = self.clamp_delay(delay);

        if self.batch_size != old_batch || self.delay_ms != old_delay {
            log::debug!(
                "Bucket usage {:.1}%: batch size {} → {}, delay {}ms → {}ms",
                usage,
                old_batch,
                self.batch_size,
                old_delay,
                self.delay_ms
            );
        }
    }

    /// Shrinks, but not below a quarter of the maximum when starting above it.
    ///
    /// Both shrinking bands share the floor, which keeps the response monotone
    /// in usage.
    fn shrink_floored(&self, value: usize, factor: f64) -> usize {
        let floor = (self.max_batch() / 4).max(1);
        let shrunk = shrink(value, factor);
        if value > floor {
            shrunk.max(floor)
        } else {
            shrunk
        }
    }

    fn max_batch(&self) -> usize {
        self.config.max_batch_size.max(1)
    }

    fn clamp_batch(&self, value: usize) -> usize {
        value.clamp(1, self.max_batch())
    }

    fn clamp_delay(&self, value: u64) -> u64 {
        let max = self.config.max_delay_ms;
        value.clamp(self.config.min_delay_ms.min(max), max)
    }
}

// Absorbs representation error in the factors (100.0 * 1.1 > 110.0)
const ROUNDING_SLACK: f64 = 1e-9;

/// Scales down by `factor`, by at least one.
fn shrink(value: usize, factor: f64) -> usize {
    let scaled = (value as f64 * factor + ROUNDING_SLACK).floor() as usize;
    scaled.min(value.saturating_sub(1))
}

/// Scales up by `factor`, by at least one.
fn grow(value: usize, factor: f64) -> usize {
    let scaled = (value as f64 * factor - ROUNDING_SLACK).ceil() as usize;
    scaled.max(value.saturating_add(1))
}

fn shrink_delay(value: u64, factor: f64) -> u64 {
    let scaled = (value as f64 * factor + ROUNDING_SLACK).floor() as u64;
    scaled.min(value.saturating_sub(1))
}

fn grow_delay(value: u64, factor: f64) -> u64 {
    let scaled = (value as f64 * factor - ROUNDING_SLACK).ceil() as u64;
    scaled.max(value.saturating_add(1))
}
