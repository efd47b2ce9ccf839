//! GraphQL request execution.
//!
//! This module provides:
//! - The [`OperationExecutor`] seam the scheduler drives
//! - `ShopifyClient`, the reqwest-backed Admin API executor
//! - Response parsing (cost extensions, throttle status, error classification)

mod response;
mod shopify;

use futures::future::BoxFuture;

use crate::models::TelemetrySample;
use crate::operations::GraphqlRequest;

pub use response::parse_response;
pub use shopify::ShopifyClient;

/// Performs one GraphQL round trip.
///
/// Implementations never fail: every transport, HTTP or GraphQL problem is
/// reported as a failed [`TelemetrySample`] with an
/// [`ErrorKind`](crate::error_handling::ErrorKind). The returned future must be
/// `Send` so operations can run on spawned tasks.
pub trait OperationExecutor: Send + Sync {
    /// Sends `request` and reports what happened.
    fn execute<'a>(&'a self, request: &'a GraphqlRequest) -> BoxFuture<'a, TelemetrySample>;
}
