//! Error handling.
//!
//! This module provides:
//! - Run-level error types (`InitializationError`, `BenchmarkError`)
//! - Operation-level failure classification (`ErrorKind`)
//! - Transport error categorization and the calibration retry strategy
//!
//! Only configuration errors and cancellation end a run early. Everything that
//! goes wrong with a single operation is captured as an `ErrorKind` on its result.

mod categorization;
mod types;

// Re-export public API
pub use categorization::{
    advised_wait, categorize_reqwest_error, categorize_status, get_calibration_retry_strategy,
    parse_retry_after,
};
pub use types::{BenchmarkError, ErrorKind, InitializationError};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_error_kind_has_a_label() {
        for kind in ErrorKind::iter() {
            assert!(!kind.as_str().is_empty());
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_benchmark_error_messages() {
        let err = BenchmarkError::InvalidCount(0);
        assert!(err.to_string().contains("at least 1"));

        let err = BenchmarkError::InvalidControllerConfig("bad".to_string());
        assert!(err.to_string().contains("bad"));
    }
}
