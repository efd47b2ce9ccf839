//! Main application modules.
//!
//! This module provides progress logging, shutdown handling, and statistics
//! printing used by the benchmark run.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::{log_batch_progress, BatchProgress};
pub use shutdown::{install_interrupt_handler, shutdown_gracefully};
pub use statistics::log_report;
