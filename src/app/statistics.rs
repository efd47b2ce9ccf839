//! Statistics printing.

use log::info;

use crate::run::BenchmarkReport;

/// Logs the full report: totals, throughput, error counts, projections and
/// bucket pressure.
pub fn log_report(report: &BenchmarkReport) {
    let summary = &report.summary;

    info!(
        "✅ {} {} operation(s) in {:.1}s over {} batch(es): {} succeeded, {} failed ({:.1}% success)",
        report.attempted,
        report.operation,
        report.elapsed_seconds,
        report.batches,
        summary.success_count,
        summary.failure_count,
        summary.success_rate_pct()
    );
    if report.shortfall > 0 {
        info!(
            "{} of {} requested operation(s) skipped: not enough target records",
            report.shortfall, report.requested
        );
    }
    if report.cancelled {
        info!(
            "Run was cancelled; {} of {} requested operation(s) attempted",
            report.attempted, report.requested
        );
    }

    info!(
        "Throughput: {:.2} ops/sec, {:.2} cost/sec | avg response {:.3}s | total cost {:.0} (avg {:.2}/op) | {} retries",
        summary.operations_per_second,
        summary.cost_per_second,
        summary.average_response_time_seconds,
        summary.total_cost,
        summary.average_cost,
        summary.total_retries
    );

    print_error_statistics(report);

    info!("Projections (linear estimate at the observed cost rate):");
    for projection in &summary.projections {
        match projection.projected_seconds {
            Some(seconds) => info!(
                "   {:>10} ops: ~{:.0} points, ~{}",
                projection.operations,
                projection.projected_cost,
                format_duration(seconds)
            ),
            None => info!(
                "   {:>10} ops: ~{:.0} points, no throughput observed",
                projection.operations, projection.projected_cost
            ),
        }
    }

    let rate_limit = &report.rate_limit;
    if rate_limit.samples > 0 {
        info!(
            "Bucket usage: mean {:.1}%, peak {:.1}% over {} sample(s) ({} high-pressure, {} underutilized)",
            rate_limit.mean_usage_pct,
            rate_limit.peak_usage_pct,
            rate_limit.samples,
            rate_limit.high_pressure_samples,
            rate_limit.underutilized_samples
        );
    }
    info!(
        "Controller: {} tier start, finished at batch size {} / delay {}ms",
        report.calibration_tier, report.final_settings.batch_size, report.final_settings.delay_ms
    );
}

/// Logs failure counts by kind.
fn print_error_statistics(report: &BenchmarkReport) {
    let counts = &report.summary.error_counts;
    if counts.is_empty() {
        return;
    }
    info!("Error Counts ({} total):", report.summary.failure_count);
    for (kind, count) in counts {
        info!("   {}: {}", kind.as_str(), count);
    }
    if report.summary.retries_exhausted_count > 0 {
        info!(
            "   ({} operation(s) exhausted their retries)",
            report.summary.retries_exhausted_count
        );
    }
}

/// Formats seconds as a short human duration (`45s`, `12m 5s`, `3h 20m`, `2d 4h`).
fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (days, hours, minutes, secs) = (
        total / 86_400,
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60,
    );
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
