//! Integration tests for the shopify_bulk_bench library.
//!
//! These tests drive `run_benchmark()` and `BatchScheduler` end to end against
//! a mock GraphQL endpoint served by `httptest`. They make no real network
//! requests.
//!
//! The mock answers every POST with one body that carries the calibration
//! `shop`, a `products` page and the mutation root fields, so a single
//! expectation serves the whole run.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httptest::{matchers::*, responders::*, Expectation, Server};
    use serde_json::{json, Value};
    use shopify_bulk_bench::{
        run_benchmark, BatchScheduler, Config, ControllerConfig, ErrorKind, NullSink,
        OperationKind, RandomProducts, ShopifyClient,
    };
    use tokio_util::sync::CancellationToken;
    use url::Url;

    fn bucket_body(ids: &[&str], restore_rate: f64) -> Value {
        let edges: Vec<Value> = ids.iter().map(|id| json!({ "node": { "id": id } })).collect();
        json!({
            "data": {
                "shop": { "name": "Bench Shop" },
                "products": {
                    "edges": edges,
                    "pageInfo": { "hasNextPage": false, "endCursor": null }
                },
                "productCreate": {
                    "product": { "id": "gid://shopify/Product/100" },
                    "userErrors": []
                },
                "productUpdate": {
                    "product": { "id": "gid://shopify/Product/1" },
                    "userErrors": []
                }
            },
            "extensions": {
                "cost": {
                    "requestedQueryCost": 10,
                    "actualQueryCost": 10,
                    "throttleStatus": {
                        "maximumAvailable": 1000.0,
                        "currentlyAvailable": 990,
                        "restoreRate": restore_rate
                    }
                }
            }
        })
    }

    fn config_for(server: &Server, operation: OperationKind, count: usize) -> Config {
        Config {
            shop: "bench.myshopify.com".to_string(),
            access_token: "shpat_test".to_string(),
            endpoint: Some(server.url("/graphql").to_string()),
            operation,
            count,
            timeout_seconds: 5,
            controller: ControllerConfig {
                base_retry_delay_ms: 5,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_run_against_mock_server() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/graphql"),
                request::headers(contains(("x-shopify-access-token", "shpat_test"))),
            ])
            .times(1..)
            .respond_with(json_encoded(bucket_body(&[], 1_000.0))),
        );

        let report = run_benchmark(config_for(&server, OperationKind::Create, 12))
            .await
            .expect("run should succeed");

        assert_eq!(report.requested, 12);
        assert_eq!(report.attempted, 12);
        assert_eq!(report.shortfall, 0);
        assert!(!report.cancelled);
        assert_eq!(report.calibration_tier, "high");
        assert_eq!(report.summary.total_operations, 12);
        assert_eq!(report.summary.success_count, 12);
        assert_eq!(report.summary.failure_count, 0);
        assert_eq!(report.summary.total_cost, 120.0);
        assert!(report.run_id.starts_with("run_"));
        assert!(report.rate_limit.samples > 0);
    }

    #[tokio::test]
    async fn test_update_run_reports_shortfall() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/graphql"))
                .times(1..)
                .respond_with(json_encoded(bucket_body(
                    &["gid://shopify/Product/1", "gid://shopify/Product/2", "gid://shopify/Product/3"],
                    50.0,
                ))),
        );

        let report = run_benchmark(config_for(&server, OperationKind::Update, 5))
            .await
            .expect("run should succeed");

        assert_eq!(report.attempted, 3);
        assert_eq!(report.shortfall, 2);
        assert_eq!(report.summary.success_count, 3);
        assert_eq!(report.calibration_tier, "standard");
    }

    #[tokio::test]
    async fn test_huge_retry_after_does_not_abort_run() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/graphql"))
                .times(1..)
                .respond_with(
                    status_code(429).insert_header("Retry-After", "99999999999999999999"),
                ),
        );

        let mut config = config_for(&server, OperationKind::Create, 1);
        config.controller.max_retries = 0;
        let report = run_benchmark(config).await.expect("run should complete");

        assert_eq!(report.attempted, 1);
        assert_eq!(report.summary.failure_count, 1);
        assert_eq!(report.calibration_tier, "standard");
        assert_eq!(
            report.summary.error_counts.get(&ErrorKind::Throttled),
            Some(&1)
        );
    }

    #[tokio::test]
    async fn test_zero_count_is_rejected() {
        let config = Config {
            shop: "bench.myshopify.com".to_string(),
            access_token: "shpat_test".to_string(),
            count: 0,
            ..Default::default()
        };
        let err = run_benchmark(config).await.unwrap_err();
        assert!(err.to_string().contains('0'), "got: {:#}", err);
    }

    #[tokio::test]
    async fn test_unreachable_product_listing_fails_update_run() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/graphql"))
                .times(1..)
                .respond_with(status_code(401).body("Invalid API key or access token")),
        );

        let err = run_benchmark(config_for(&server, OperationKind::Delete, 5))
            .await
            .unwrap_err();
        assert!(
            format!("{:#}", err).contains("Failed to load payloads"),
            "got: {:#}",
            err
        );
    }

    #[tokio::test]
    async fn test_scheduler_with_shopify_client_counts_user_errors() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/graphql"))
                .times(1..)
                .respond_with(json_encoded(json!({
                    "data": {
                        "shop": { "name": "Bench Shop" },
                        "productCreate": {
                            "product": null,
                            "userErrors": [{ "field": ["title"], "message": "Title can't be blank" }]
                        }
                    },
                    "extensions": {
                        "cost": {
                            "requestedQueryCost": 10,
                            "actualQueryCost": 10,
                            "throttleStatus": {
                                "maximumAvailable": 1000.0,
                                "currentlyAvailable": 1000,
                                "restoreRate": 50.0
                            }
                        }
                    }
                }))),
        );

        let endpoint = Url::parse(&server.url("/graphql").to_string()).expect("valid url");
        let client = ShopifyClient::new(reqwest::Client::new(), endpoint, "shpat_test".to_string());
        let mut scheduler = BatchScheduler::new(
            ControllerConfig::default(),
            Arc::new(client),
            Arc::new(NullSink),
            CancellationToken::new(),
        );
        let mut producer = RandomProducts::new("run_test".to_string());

        let outcome = scheduler
            .run(4, &mut producer, OperationKind::Create)
            .await
            .expect("run should complete");

        assert_eq!(outcome.results.len(), 4);
        for result in &outcome.results {
            assert!(!result.success);
            assert_eq!(result.error_kind, Some(ErrorKind::UserError));
            assert_eq!(result.attempts, 1);
            assert!(!result.retries_exhausted);
        }
    }
}
