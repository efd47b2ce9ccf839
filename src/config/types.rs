//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::*;
use crate::operations::OperationKind;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Usage-percentage boundaries of the controller's response bands.
///
/// Usage above `critical` shrinks hard, above `elevated` shrinks gently,
/// within `[steady, elevated]` holds, within `[idle, steady)` grows and
/// below `idle` grows aggressively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageBands {
    /// Usage strictly above this is critical
    pub critical: f64,
    /// Usage strictly above this (and not critical) is elevated
    pub elevated: f64,
    /// Usage at or above this (and not elevated) holds steady
    pub steady: f64,
    /// Usage strictly below this is idle
    pub idle: f64,
}

impl Default for UsageBands {
    fn default() -> Self {
        Self {
            critical: 90.0,
            elevated: 75.0,
            steady: 50.0,
            idle: 30.0,
        }
    }
}

/// Multiplicative factors applied per usage band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentFactors {
    /// Batch factor for usage above `critical`
    pub critical_batch: f64,
    /// Delay factor for usage above `critical`
    pub critical_delay: f64,
    /// Batch factor for usage in the elevated band
    pub elevated_batch: f64,
    /// Delay factor for usage in the elevated band
    pub elevated_delay: f64,
    /// Batch factor for usage between `idle` and `steady`
    pub headroom_batch: f64,
    /// Delay factor for usage between `idle` and `steady`
    pub headroom_delay: f64,
    /// Batch factor for usage below `idle`
    pub idle_batch: f64,
    /// Delay factor for usage below `idle`
    pub idle_delay: f64,
    /// Applied when the failure window overflows
    pub failure_batch: f64,
    /// Applied when the failure window overflows
    pub failure_delay: f64,
}

impl Default for AdjustmentFactors {
    fn default() -> Self {
        Self {
            critical_batch: 0.85,
            critical_delay: 1.2,
            elevated_batch: 0.9,
            elevated_delay: 1.1,
            headroom_batch: 1.3,
            headroom_delay: 0.7,
            idle_batch: 1.5,
            idle_delay: 0.5,
            failure_batch: 0.8,
            failure_delay: 1.3,
        }
    }
}

/// Starting point selected by leak-rate calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTier {
    /// Tier name, used in logs and the report
    pub name: &'static str,
    /// Smallest leak rate (points/second) that selects this tier
    pub min_leak_rate: f64,
    /// Starting batch size, before the sustainable-rate cap
    pub batch_size: usize,
    /// Starting inter-batch delay in milliseconds
    pub delay_ms: u64,
}

/// Default calibration tiers, ordered from the highest leak rate down.
///
/// The boundaries are tunable thresholds, not properties of the remote API.
pub fn default_calibration_tiers() -> Vec<CalibrationTier> {
    vec![
        CalibrationTier {
            name: "enterprise",
            min_leak_rate: 2_000.0,
            batch_size: 150,
            delay_ms: 10,
        },
        CalibrationTier {
            name: "high",
            min_leak_rate: 1_000.0,
            batch_size: 80,
            delay_ms: 25,
        },
        CalibrationTier {
            name: "medium",
            min_leak_rate: 200.0,
            batch_size: 30,
            delay_ms: 50,
        },
        CalibrationTier {
            name: "standard",
            min_leak_rate: 0.0,
            batch_size: 10,
            delay_ms: 100,
        },
    ]
}

/// Tuning for the rate-limit controller and retry wrapper.
///
/// Every field has a default; construct with `..Default::default()` to
/// override a subset.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Batch size after `reset()`
    pub default_batch_size: usize,
    /// Delay after `reset()`
    pub default_delay_ms: u64,
    /// Largest batch the controller recommends
    pub max_batch_size: usize,
    /// Smallest inter-batch delay
    pub min_delay_ms: u64,
    /// Largest inter-batch delay, also the retry backoff cap
    pub max_delay_ms: u64,
    /// Retries per logical operation
    pub max_retries: u32,
    /// First retry delay, doubled per further attempt
    pub base_retry_delay_ms: u64,
    /// Usage above this counts as a high-pressure sample
    pub high_usage_threshold_pct: f64,
    /// Usage below this counts as an underutilized sample
    pub low_usage_threshold_pct: f64,
    /// `optimize_for_throughput` acts only below this recent usage
    pub optimize_usage_ceiling_pct: f64,
    /// Batch increment of one throughput nudge (doubled in high-throughput mode)
    pub optimize_batch_increment: usize,
    /// Delay decrement of one throughput nudge
    pub optimize_delay_decrement_ms: u64,
    /// Leak rate that switches on high-throughput mode
    pub high_throughput_leak_rate: f64,
    /// Age after which a failure stops counting
    pub failure_window: Duration,
    /// Failures inside the window tolerated before a forced slowdown
    pub failure_threshold: usize,
    /// Snapshots kept for recent usage
    pub history_window: usize,
    /// Usage band boundaries
    pub bands: UsageBands,
    /// Per-band adjustment factors
    pub factors: AdjustmentFactors,
    /// Ordered from the highest `min_leak_rate` down; the last entry is the fallback
    pub tiers: Vec<CalibrationTier>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_batch_size: DEFAULT_BATCH_SIZE,
            default_delay_ms: DEFAULT_DELAY_MS,
            max_batch_size: MAX_BATCH_SIZE,
            min_delay_ms: MIN_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
            max_retries: MAX_RETRIES,
            base_retry_delay_ms: BASE_RETRY_DELAY_MS,
            high_usage_threshold_pct: HIGH_USAGE_THRESHOLD_PCT,
            low_usage_threshold_pct: LOW_USAGE_THRESHOLD_PCT,
            optimize_usage_ceiling_pct: OPTIMIZE_USAGE_CEILING_PCT,
            optimize_batch_increment: OPTIMIZE_BATCH_INCREMENT,
            optimize_delay_decrement_ms: OPTIMIZE_DELAY_DECREMENT_MS,
            high_throughput_leak_rate: HIGH_THROUGHPUT_LEAK_RATE,
            failure_window: FAILURE_WINDOW,
            failure_threshold: FAILURE_THRESHOLD,
            history_window: HISTORY_WINDOW,
            bands: UsageBands::default(),
            factors: AdjustmentFactors::default(),
            tiers: default_calibration_tiers(),
        }
    }
}

impl ControllerConfig {
    /// Checks the bounds the controller relies on.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated bound.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_batch_size == 0 {
            return Err("max_batch_size must be at least 1".to_string());
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(format!(
                "min_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.min_delay_ms, self.max_delay_ms
            ));
        }
        if self.tiers.is_empty() {
            return Err("at least one calibration tier is required".to_string());
        }
        Ok(())
    }
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use shopify_bulk_bench::Config;
/// use shopify_bulk_bench::OperationKind;
///
/// let config = Config {
///     shop: "example.myshopify.com".to_string(),
///     access_token: "shpat_xxx".to_string(),
///     operation: OperationKind::Create,
///     count: 500,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Shop domain, e.g. `example.myshopify.com`
    pub shop: String,

    /// Admin API access token
    pub access_token: String,

    /// Admin API version
    pub api_version: String,

    /// Full GraphQL endpoint, overriding the one derived from `shop`
    pub endpoint: Option<String>,

    /// Kind of mutation to run
    pub operation: OperationKind,

    /// Number of operations requested
    pub count: usize,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Controller and retry tuning
    pub controller: ControllerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shop: String::new(),
            access_token: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            endpoint: None,
            operation: OperationKind::Create,
            count: 100,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            controller: ControllerConfig::default(),
        }
    }
}

/// Command-line options for the `shopify_bulk_bench` binary.
#[derive(Debug, Parser)]
#[command(name = "shopify_bulk_bench", version, about)]
pub struct Cli {
    /// Shop domain (e.g. example.myshopify.com)
    #[arg(long, env = "SHOPIFY_SHOP")]
    pub shop: String,

    /// Admin API access token
    #[arg(long, env = "SHOPIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Admin API version
    #[arg(long, default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Full GraphQL endpoint URL (overrides the one derived from --shop)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Mutation to run
    #[arg(long, value_enum, default_value_t = OperationKind::Create)]
    pub operation: OperationKind,

    /// Number of operations to perform
    #[arg(long, default_value_t = 100, value_parser = parse_count)]
    pub count: usize,

    /// Largest batch the controller may recommend
    #[arg(long, default_value_t = MAX_BATCH_SIZE)]
    pub max_batch_size: usize,

    /// Smallest inter-batch delay in milliseconds
    #[arg(long, default_value_t = MIN_DELAY_MS)]
    pub min_delay_ms: u64,

    /// Largest inter-batch delay in milliseconds
    #[arg(long, default_value_t = MAX_DELAY_MS)]
    pub max_delay_ms: u64,

    /// Retries per operation
    #[arg(long, default_value_t = MAX_RETRIES)]
    pub max_retries: u32,

    /// Base retry delay in milliseconds (doubled per attempt)
    #[arg(long, default_value_t = BASE_RETRY_DELAY_MS)]
    pub base_retry_delay_ms: u64,

    /// Bucket usage percentage counted as high pressure
    #[arg(long, default_value_t = HIGH_USAGE_THRESHOLD_PCT)]
    pub high_usage_threshold_pct: f64,

    /// Bucket usage percentage counted as underutilized
    #[arg(long, default_value_t = LOW_USAGE_THRESHOLD_PCT)]
    pub low_usage_threshold_pct: f64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Parses an operation count and clamps it into `[1, MAX_OPERATION_COUNT]`.
///
/// Zero and negative values are rejected rather than clamped.
pub fn parse_count(raw: &str) -> Result<usize, String> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{raw}' is not a whole number"));
    }
    if negative || digits.bytes().all(|b| b == b'0') {
        return Err(format!("count must be at least 1, got {trimmed}"));
    }
    // Too many digits for usize is far above the cap anyway
    Ok(digits
        .parse::<usize>()
        .map_or(MAX_OPERATION_COUNT, |value| value.min(MAX_OPERATION_COUNT)))
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let controller = ControllerConfig {
            max_batch_size: cli.max_batch_size,
            min_delay_ms: cli.min_delay_ms,
            max_delay_ms: cli.max_delay_ms,
            max_retries: cli.max_retries,
            base_retry_delay_ms: cli.base_retry_delay_ms,
            high_usage_threshold_pct: cli.high_usage_threshold_pct,
            low_usage_threshold_pct: cli.low_usage_threshold_pct,
            ..ControllerConfig::default()
        };
        Config {
            shop: cli.shop,
            access_token: cli.access_token,
            api_version: cli.api_version,
            endpoint: cli.endpoint,
            operation: cli.operation,
            count: cli.count,
            timeout_seconds: cli.timeout_seconds,
            log_level: cli.log_level,
            log_format: cli.log_format,
            controller,
            ..Config::default()
        }
    }
}
