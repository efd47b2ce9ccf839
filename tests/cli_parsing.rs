//! Tests for command-line parsing and its mapping onto `Config`.

use clap::Parser;
use shopify_bulk_bench::config::{Cli, MAX_OPERATION_COUNT};
use shopify_bulk_bench::{Config, LogFormat, LogLevel, OperationKind};

fn parse(extra: &[&str]) -> Result<Cli, clap::Error> {
    let mut args = vec![
        "shopify_bulk_bench",
        "--shop",
        "bench.myshopify.com",
        "--access-token",
        "shpat_test",
    ];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args)
}

#[test]
fn test_defaults() {
    let cli = parse(&[]).expect("should parse");
    assert_eq!(cli.shop, "bench.myshopify.com");
    assert_eq!(cli.access_token, "shpat_test");
    assert_eq!(cli.operation, OperationKind::Create);
    assert_eq!(cli.count, 100);
    assert_eq!(cli.max_batch_size, 250);
    assert_eq!(cli.min_delay_ms, 10);
    assert_eq!(cli.max_delay_ms, 5_000);
    assert_eq!(cli.max_retries, 3);
    assert_eq!(cli.log_level, LogLevel::Info);
    assert_eq!(cli.log_format, LogFormat::Plain);
    assert!(cli.endpoint.is_none());
}

#[test]
fn test_operation_values() {
    for (raw, kind) in [
        ("create", OperationKind::Create),
        ("update", OperationKind::Update),
        ("delete", OperationKind::Delete),
    ] {
        let cli = parse(&["--operation", raw]).expect("should parse");
        assert_eq!(cli.operation, kind);
    }
    assert!(parse(&["--operation", "upsert"]).is_err());
}

#[test]
fn test_count_is_clamped_to_maximum() {
    let cli = parse(&["--count", "25000000"]).expect("should parse");
    assert_eq!(cli.count, MAX_OPERATION_COUNT);
    assert_eq!(cli.count, 1_000_000);

    let cli = parse(&["--count", "99999999999999999999999"]).expect("should parse");
    assert_eq!(cli.count, MAX_OPERATION_COUNT);
}

#[test]
fn test_count_below_one_is_rejected() {
    assert!(parse(&["--count", "0"]).is_err());
    assert!(parse(&["--count=-3"]).is_err());
    assert!(parse(&["--count", "lots"]).is_err());
}

#[test]
fn test_log_options() {
    let cli = parse(&["--log-level", "debug", "--log-format", "json"]).expect("should parse");
    assert_eq!(cli.log_level, LogLevel::Debug);
    assert_eq!(cli.log_format, LogFormat::Json);
}

#[test]
fn test_config_from_cli_maps_controller_options() {
    let cli = parse(&[
        "--operation",
        "delete",
        "--count",
        "40",
        "--max-batch-size",
        "60",
        "--min-delay-ms",
        "20",
        "--max-delay-ms",
        "900",
        "--max-retries",
        "5",
        "--base-retry-delay-ms",
        "100",
        "--high-usage-threshold-pct",
        "85",
        "--low-usage-threshold-pct",
        "35",
        "--endpoint",
        "http://127.0.0.1:9/graphql",
        "--timeout-seconds",
        "7",
    ])
    .expect("should parse");

    let config: Config = cli.into();
    assert_eq!(config.operation, OperationKind::Delete);
    assert_eq!(config.count, 40);
    assert_eq!(config.timeout_seconds, 7);
    assert_eq!(config.endpoint.as_deref(), Some("http://127.0.0.1:9/graphql"));
    assert_eq!(config.controller.max_batch_size, 60);
    assert_eq!(config.controller.min_delay_ms, 20);
    assert_eq!(config.controller.max_delay_ms, 900);
    assert_eq!(config.controller.max_retries, 5);
    assert_eq!(config.controller.base_retry_delay_ms, 100);
    assert_eq!(config.controller.high_usage_threshold_pct, 85.0);
    assert_eq!(config.controller.low_usage_threshold_pct, 35.0);
    // Untouched tuning keeps its defaults
    assert_eq!(config.controller.failure_threshold, 5);
    assert_eq!(config.controller.tiers.len(), 4);
    assert!(config.controller.validate().is_ok());
}
