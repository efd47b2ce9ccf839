//! Summary statistics over a run's operation results.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::config::PROJECTION_MILESTONES;
use crate::error_handling::ErrorKind;
use crate::models::OperationResult;

/// Estimated cost and duration for a larger run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Milestone operation count
    pub operations: u64,
    /// `operations * average_cost`
    pub projected_cost: f64,
    /// `None` when the run observed no cost throughput to extrapolate from
    pub projected_seconds: Option<f64>,
}

/// Derived statistics for one run.
///
/// Recomputed from the result list on demand; never updated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSummary {
    /// Operations attempted
    pub total_operations: usize,
    /// Operations that succeeded
    pub success_count: usize,
    /// Operations that failed
    pub failure_count: usize,
    /// Mean response time over successful operations only
    pub average_response_time_seconds: f64,
    /// Points charged by every attempt, failed ones included
    pub total_cost: f64,
    /// `total_cost / total_operations`
    pub average_cost: f64,
    /// Total cost over the summed response time of successful operations
    pub cost_per_second: f64,
    /// `total_operations / elapsed_seconds`
    pub operations_per_second: f64,
    /// Wall time of the run
    pub elapsed_seconds: f64,
    /// Attempts beyond the first, across all operations
    pub total_retries: u64,
    /// Operations whose every attempt failed
    pub retries_exhausted_count: usize,
    /// Failure counts by kind; kinds that never occurred are absent
    pub error_counts: BTreeMap<ErrorKind, usize>,
    /// One entry per projection milestone
    pub projections: Vec<Projection>,
}

impl BenchmarkSummary {
    /// Share of operations that succeeded, in percent (0 for an empty run).
    pub fn success_rate_pct(&self) -> f64 {
        if self.total_operations == 0 {
            0.0
        } else {
            self.success_count as f64 * 100.0 / self.total_operations as f64
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && numerator.is_finite() {
        numerator / denominator
    } else {
        0.0
    }
}

/// Reduces `results` into summary statistics.
///
/// Pure: the same inputs always produce the same summary.
///
/// Projections are a linear extrapolation that assumes the observed cost
/// throughput (`total_cost / elapsed_seconds`) holds at every scale:
/// `projected_cost = milestone * average_cost` and
/// `projected_seconds = projected_cost / (total_cost / elapsed_seconds)`.
/// They ignore how the controller converges on long runs and are optimistic
/// for large milestones; treat them as estimates, not bounds.
pub fn summarize(results: &[OperationResult], elapsed_seconds: f64) -> BenchmarkSummary {
    let total_operations = results.len();
    let success_count = results.iter().filter(|r| r.success).count();
    let failure_count = total_operations - success_count;

    let successful_time: f64 = results
        .iter()
        .filter(|r| r.success)
        .map(|r| r.response_time_seconds)
        .sum();
    let total_cost: f64 = results.iter().map(|r| r.cost).sum();
    let average_cost = ratio(total_cost, total_operations as f64);

    let mut error_counts = BTreeMap::new();
    for kind in ErrorKind::iter() {
        let count = results
            .iter()
            .filter(|r| !r.success && r.error_kind == Some(kind))
            .count();
        if count > 0 {
            error_counts.insert(kind, count);
        }
    }

    let cost_rate = ratio(total_cost, elapsed_seconds);
    let projections = PROJECTION_MILESTONES
        .iter()
        .map(|&operations| {
            let projected_cost = operations as f64 * average_cost;
            Projection {
                operations,
                projected_cost,
                projected_seconds: (cost_rate > 0.0).then(|| projected_cost / cost_rate),
            }
        })
        .collect();

    BenchmarkSummary {
        total_operations,
        success_count,
        failure_count,
        average_response_time_seconds: ratio(successful_time, success_count as f64),
        total_cost,
        average_cost,
        cost_per_second: if success_count > 0 {
            ratio(total_cost, successful_time)
        } else {
            0.0
        },
        operations_per_second: ratio(total_operations as f64, elapsed_seconds),
        elapsed_seconds,
        total_retries: results
            .iter()
            .map(|r| u64::from(r.attempts.saturating_sub(1)))
            .sum(),
        retries_exhausted_count: results.iter().filter(|r| r.retries_exhausted).count(),
        error_counts,
        projections,
    }
}
