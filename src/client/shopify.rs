//! Shopify Admin API client.

use std::time::Instant;

use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use reqwest::header::RETRY_AFTER;
use serde_json::Value;
use tokio_retry::RetryIf;
use url::Url;

use super::response::parse_response;
use super::OperationExecutor;
use crate::config::{ACCESS_TOKEN_HEADER, PRODUCT_PAGE_SIZE};
use crate::error_handling::{
    categorize_reqwest_error, categorize_status, get_calibration_retry_strategy,
    parse_retry_after,
};
use crate::models::TelemetrySample;
use crate::operations::GraphqlRequest;

/// Longest slice of an error body kept in a failure message.
const ERROR_BODY_PREVIEW: usize = 200;

/// Executes GraphQL requests against one shop's Admin API endpoint.
#[derive(Debug, Clone)]
pub struct ShopifyClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: String,
}

impl ShopifyClient {
    /// Creates a client posting to `endpoint` with `access_token`.
    pub fn new(http: reqwest::Client, endpoint: Url, access_token: impl Into<String>) -> Self {
        ShopifyClient {
            http,
            endpoint,
            access_token: access_token.into(),
        }
    }

    /// GraphQL endpoint requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends the request and decodes the body, or reports why that failed.
    async fn round_trip(
        &self,
        request: &GraphqlRequest,
        start: Instant,
    ) -> Result<Value, TelemetrySample> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                TelemetrySample::failure(categorize_reqwest_error(&e), e.to_string(), start.elapsed())
            })?;

        let status = response.status();
        if let Some(kind) = categorize_status(status.as_u16()) {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            let message = if preview.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, preview.trim())
            };
            return Err(TelemetrySample::failure(kind, message, start.elapsed())
                .with_retry_after(retry_after));
        }

        response.json::<Value>().await.map_err(|e| {
            TelemetrySample::failure(
                categorize_reqwest_error(&e),
                format!("Failed to decode GraphQL response: {}", e),
                start.elapsed(),
            )
        })
    }

    async fn send(&self, request: &GraphqlRequest) -> TelemetrySample {
        let start = Instant::now();
        match self.round_trip(request, start).await {
            Ok(body) => parse_response(&body, request.kind, start.elapsed()),
            Err(failure) => failure,
        }
    }

    /// Fetches one page of product ids, retrying retriable failures.
    async fn fetch_page(&self, first: usize, after: Option<&str>) -> Result<Value> {
        let request = &GraphqlRequest::product_ids(first, after);
        RetryIf::spawn(
            get_calibration_retry_strategy(),
            || async move {
                let start = Instant::now();
                let body = self.round_trip(request, start).await?;
                let sample = parse_response(&body, None, start.elapsed());
                if sample.success {
                    Ok(body)
                } else {
                    Err(sample)
                }
            },
            |failure: &TelemetrySample| failure.error_kind.is_some_and(|k| k.is_retriable()),
        )
        .await
        .map_err(describe)
    }

    /// Collects up to `limit` existing product ids, oldest pages first.
    ///
    /// Fewer ids are returned when the shop has fewer products.
    ///
    /// # Errors
    ///
    /// Returns an error if a page still fails after its retries.
    pub async fn fetch_product_ids(&self, limit: usize) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(limit.min(PRODUCT_PAGE_SIZE * 4));
        let mut cursor: Option<String> = None;

        while ids.len() < limit {
            let first = (limit - ids.len()).min(PRODUCT_PAGE_SIZE);
            let body = self.fetch_page(first, cursor.as_deref()).await?;

            let products = body
                .pointer("/data/products")
                .ok_or_else(|| anyhow!("Response is missing 'products'"))?;
            let edges = products
                .get("edges")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            ids.extend(
                edges
                    .iter()
                    .filter_map(|edge| edge.pointer("/node/id").and_then(Value::as_str))
                    .map(str::to_string),
            );

            let has_next = products
                .pointer("/pageInfo/hasNextPage")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            cursor = products
                .pointer("/pageInfo/endCursor")
                .and_then(Value::as_str)
                .map(str::to_string);
            if !has_next || cursor.is_none() || edges.is_empty() {
                break;
            }
        }

        ids.truncate(limit);
        log::info!("Loaded {} existing product id(s)", ids.len());
        Ok(ids)
    }
}

fn describe(sample: TelemetrySample) -> anyhow::Error {
    let kind = sample
        .error_kind
        .map(|k| k.as_str())
        .unwrap_or("Unknown error");
    match sample.error_message {
        Some(message) => anyhow!("{}: {}", kind, message),
        None => anyhow!("{}", kind),
    }
}

impl OperationExecutor for ShopifyClient {
    fn execute<'a>(&'a self, request: &'a GraphqlRequest) -> BoxFuture<'a, TelemetrySample> {
        Box::pin(self.send(request))
    }
}
