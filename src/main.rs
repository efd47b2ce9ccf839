//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `shopify_bulk_bench` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use shopify_bulk_bench::config::Cli;
use shopify_bulk_bench::initialization::init_logger_with;
use shopify_bulk_bench::{run_benchmark, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // SHOPIFY_SHOP / SHOPIFY_ACCESS_TOKEN may come from .env, here or next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config: Config = Cli::parse().into();

    init_logger_with(config.log_level.into(), config.log_format)
        .context("Failed to initialize logger")?;

    match run_benchmark(config).await {
        Ok(report) => {
            println!(
                "✅ {} {} operation{} ({} succeeded, {} failed) in {:.1}s - {:.2} ops/sec, {:.0} points spent{}",
                report.attempted,
                report.operation,
                if report.attempted == 1 { "" } else { "s" },
                report.summary.success_count,
                report.summary.failure_count,
                report.elapsed_seconds,
                report.summary.operations_per_second,
                report.summary.total_cost,
                if report.cancelled { " (cancelled)" } else { "" }
            );
            if report.shortfall > 0 {
                println!(
                    "{} requested operation{} skipped: not enough existing products",
                    report.shortfall,
                    if report.shortfall == 1 { "" } else { "s" }
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("shopify_bulk_bench error: {:#}", e);
            process::exit(1);
        }
    }
}
