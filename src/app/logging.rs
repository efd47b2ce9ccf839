//! Progress logging utilities.

use log::info;
use std::time::Instant;

use crate::adaptive_rate_limiter::ControllerSettings;

/// What one settled batch did, for progress logging.
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress {
    /// 1-based batch number
    pub batch_number: usize,
    /// Operations in this batch
    pub batch_size: usize,
    /// Operations in this batch that failed
    pub batch_failures: usize,
    /// Operations attempted so far, this batch included
    pub processed: usize,
    /// Operations requested for the run
    pub total: usize,
    /// Settings the next batch will use
    pub next_settings: ControllerSettings,
}

/// Logs progress after a batch has settled.
pub fn log_batch_progress(start_time: Instant, progress: &BatchProgress) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        progress.processed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Batch {}: {} op(s), {} failed | {}/{} done in {:.2}s (~{:.1} ops/sec) | next batch {} after {}ms",
        progress.batch_number,
        progress.batch_size,
        progress.batch_failures,
        progress.processed,
        progress.total,
        elapsed_secs,
        rate,
        progress.next_settings.batch_size,
        progress.next_settings.delay_ms
    );
}
