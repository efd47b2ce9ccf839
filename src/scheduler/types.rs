//! Run outcome types.

use std::time::Duration;

use crate::adaptive_rate_limiter::ControllerSettings;
use crate::metrics::RateLimitStats;
use crate::models::OperationResult;

/// Everything a finished (or cancelled) run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Operations asked for
    pub requested: usize,
    /// One result per attempted operation, in payload order
    pub results: Vec<OperationResult>,
    /// Wall time from calibration to the last batch
    pub elapsed: Duration,
    /// Operations attempted in each batch; sums to `results.len()`
    pub batch_sizes: Vec<usize>,
    /// Operations not attempted because the payload source ran dry
    pub shortfall: usize,
    /// The run was interrupted before every operation was attempted
    pub cancelled: bool,
    /// Bucket pressure observed during the run
    pub rate_limit: RateLimitStats,
    /// Controller settings after the last batch
    pub final_settings: ControllerSettings,
    /// Tier chosen by calibration
    pub calibration_tier: &'static str,
    /// High-throughput mode was on at the end of the run
    pub high_throughput_mode: bool,
}

impl RunOutcome {
    /// Operations attempted.
    pub fn attempted(&self) -> usize {
        self.results.len()
    }
}
