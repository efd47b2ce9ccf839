//! Utility functions for operation processing.
//!
//! This module provides:
//! - Bounded retry with exponential backoff around a single operation

mod retry;

pub use retry::{RetryExecutor, RetryOutcome};
