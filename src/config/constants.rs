//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the application,
//! including controller defaults, retry timing, calibration tiers and API details.

use std::time::Duration;

// Controller defaults
/// Batch size the controller starts from after `reset()`
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Inter-batch delay the controller starts from after `reset()`
pub const DEFAULT_DELAY_MS: u64 = 50;
/// Upper bound on operations dispatched in one batch
pub const MAX_BATCH_SIZE: usize = 250;
/// Lower bound on the inter-batch delay
pub const MIN_DELAY_MS: u64 = 10;
/// Upper bound on the inter-batch delay (also caps retry backoff)
pub const MAX_DELAY_MS: u64 = 5_000;

// Retry strategy
/// Retries per logical operation (attempts = retries + 1)
pub const MAX_RETRIES: u32 = 3;
/// First retry waits this long; doubled on every further attempt
pub const BASE_RETRY_DELAY_MS: u64 = 250;
/// Longest server-advised wait (`Retry-After`, throttle restore time) honoured
/// before a retry; larger advice is cut down to this
pub const MAX_ADVISED_WAIT: Duration = Duration::from_secs(60);
/// Calibration query retry: initial delay in milliseconds
pub const CALIBRATION_RETRY_INITIAL_DELAY_MS: u64 = 100;
/// Calibration query retry: number of retries after the first attempt
pub const CALIBRATION_RETRY_ATTEMPTS: usize = 2;

// Usage thresholds (percent of bucket capacity)
/// Samples above this usage count as "pressure" samples in the report
pub const HIGH_USAGE_THRESHOLD_PCT: f64 = 80.0;
/// Samples below this usage count as "underutilized" samples in the report
pub const LOW_USAGE_THRESHOLD_PCT: f64 = 40.0;
/// `optimize_for_throughput` only pushes when recent usage is below this
pub const OPTIMIZE_USAGE_CEILING_PCT: f64 = 60.0;

// Failure window
/// Failures older than this no longer count towards the failure threshold
pub const FAILURE_WINDOW: Duration = Duration::from_secs(60);
/// More failures than this inside the window force a slowdown
pub const FAILURE_THRESHOLD: usize = 5;
/// Number of rate-limit snapshots kept for "recent usage"
pub const HISTORY_WINDOW: usize = 20;

// Throughput nudge
/// Batch size increment applied by `optimize_for_throughput`
pub const OPTIMIZE_BATCH_INCREMENT: usize = 5;
/// Delay decrement applied by `optimize_for_throughput`
pub const OPTIMIZE_DELAY_DECREMENT_MS: u64 = 10;

// Calibration
/// Leak rate at or above which the run is flagged high-throughput
pub const HIGH_THROUGHPUT_LEAK_RATE: f64 = 1_000.0;
/// Estimated cost of one product mutation, used before real costs are known
pub const ESTIMATED_MUTATION_COST: f64 = 10.0;

// Run boundary
/// Largest operation count accepted at the CLI boundary
pub const MAX_OPERATION_COUNT: usize = 1_000_000;
/// Milestones used for throughput projections
pub const PROJECTION_MILESTONES: [u64; 4] = [1_000, 100_000, 1_000_000, 10_000_000];

// Shopify Admin API
/// Admin API version used when none is given
pub const DEFAULT_API_VERSION: &str = "2024-10";
/// Header carrying the Admin API access token
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
/// Page size used when listing existing products
pub const PRODUCT_PAGE_SIZE: usize = 250;
/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// User-Agent header value
pub const DEFAULT_USER_AGENT: &str = concat!("shopify_bulk_bench/", env!("CARGO_PKG_VERSION"));

// HTTP status codes (for clarity and consistency)
/// Status returned when the request was rate limited
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
