//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (controller defaults, retry timing, API details)
//! - Controller tuning types
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    default_calibration_tiers, parse_count, AdjustmentFactors, CalibrationTier, Cli, Config,
    ControllerConfig, LogFormat, LogLevel, UsageBands,
};
