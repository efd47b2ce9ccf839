//! Running statistics over the bucket samples observed during a run.

use crate::models::RateLimitSnapshot;

/// Bucket pressure observed over a run.
///
/// Samples with an unknown capacity only update the last leak rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitStats {
    /// Samples with a known capacity
    pub samples: usize,
    /// Mean bucket usage over those samples
    pub mean_usage_pct: f64,
    /// Highest bucket usage seen
    pub peak_usage_pct: f64,
    /// Samples above the high usage threshold
    pub high_pressure_samples: usize,
    /// Samples below the low usage threshold
    pub underutilized_samples: usize,
    /// Capacity reported by the latest sample
    pub last_capacity: Option<f64>,
    /// Leak rate reported by the latest sample
    pub last_leak_rate: Option<f64>,
    high_threshold_pct: f64,
    low_threshold_pct: f64,
    usage_sum: f64,
}

impl RateLimitStats {
    /// Empty statistics counting against the given usage thresholds.
    pub fn new(high_threshold_pct: f64, low_threshold_pct: f64) -> Self {
        RateLimitStats {
            samples: 0,
            mean_usage_pct: 0.0,
            peak_usage_pct: 0.0,
            high_pressure_samples: 0,
            underutilized_samples: 0,
            last_capacity: None,
            last_leak_rate: None,
            high_threshold_pct,
            low_threshold_pct,
            usage_sum: 0.0,
        }
    }

    /// Folds one bucket sample into the statistics.
    pub fn record(&mut self, snapshot: &RateLimitSnapshot) {
        self.last_leak_rate = Some(snapshot.leak_rate_per_second);
        let Some(usage) = snapshot.usage_pct() else {
            return;
        };

        self.samples += 1;
        self.usage_sum += usage;
        self.mean_usage_pct = self.usage_sum / self.samples as f64;
        self.peak_usage_pct = self.peak_usage_pct.max(usage);
        self.last_capacity = Some(snapshot.bucket_capacity);

        if usage > self.high_threshold_pct {
            self.high_pressure_samples += 1;
        } else if usage < self.low_threshold_pct {
            self.underutilized_samples += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_usage(used: f64) -> RateLimitSnapshot {
        RateLimitSnapshot::from_bucket(100.0, 100.0 - used, 50.0, 1.0)
    }

    #[test]
    fn test_stats_track_mean_peak_and_bands() {
        let mut stats = RateLimitStats::new(80.0, 40.0);
        for used in [10.0, 50.0, 90.0] {
            stats.record(&at_usage(used));
        }

        assert_eq!(stats.samples, 3);
        assert_eq!(stats.mean_usage_pct, 50.0);
        assert_eq!(stats.peak_usage_pct, 90.0);
        assert_eq!(stats.high_pressure_samples, 1);
        assert_eq!(stats.underutilized_samples, 1);
        assert_eq!(stats.last_capacity, Some(100.0));
        assert_eq!(stats.last_leak_rate, Some(50.0));
    }

    #[test]
    fn test_unknown_capacity_is_not_a_usage_sample() {
        let mut stats = RateLimitStats::new(80.0, 40.0);
        stats.record(&RateLimitSnapshot::from_bucket(0.0, 0.0, 25.0, 1.0));
        assert_eq!(stats.samples, 0);
        assert_eq!(stats.last_leak_rate, Some(25.0));
        assert_eq!(stats.last_capacity, None);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let mut stats = RateLimitStats::new(80.0, 40.0);
        stats.record(&at_usage(80.0));
        stats.record(&at_usage(40.0));
        assert_eq!(stats.high_pressure_samples, 0);
        assert_eq!(stats.underutilized_samples, 0);
    }
}
