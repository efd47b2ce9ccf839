//! Adaptive rate limiting driven by leaky-bucket telemetry.
//!
//! This module implements the controller that sizes batches and paces them:
//! - Calibrates starting settings from the bucket's leak rate (tiered)
//! - Shrinks or grows batch size and delay from each attempt's bucket usage
//! - Forces a slowdown when failures pile up inside a 60s window
//! - Offers an explicit throughput nudge after clean batches
//!
//! The controller is owned by the scheduler and mutated only between batches,
//! so it needs no locking.

mod controller;
mod window;

pub use controller::{ControllerSettings, RateLimitController, RetryBackoff};
