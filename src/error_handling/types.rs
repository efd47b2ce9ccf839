//! Error type definitions.
//!
//! This module defines the run-level error enums and the classification used for
//! operation-level failures, which are reported as values rather than errors.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The GraphQL endpoint could not be derived from the configuration.
    #[error("Invalid GraphQL endpoint '{0}': {1}")]
    EndpointError(String, url::ParseError),
}

/// Errors that abort a benchmark run before any batch is dispatched.
///
/// Operation-level failures never surface here; they are recorded in
/// [`crate::OperationResult`].
#[derive(Error, Debug, PartialEq)]
pub enum BenchmarkError {
    /// Zero operations were requested.
    #[error("Operation count must be at least 1, got {0}")]
    InvalidCount(usize),

    /// The controller configuration violates one of its bounds.
    #[error("Invalid controller configuration: {0}")]
    InvalidControllerConfig(String),

    /// Target records for an update/delete run could not be loaded.
    #[error("Failed to load payloads: {0}")]
    PayloadLoadError(String),
}

/// Classification of a failed attempt.
///
/// Every failed `TelemetrySample` and `OperationResult` carries one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIterMacro)]
pub enum ErrorKind {
    /// HTTP 429 or a GraphQL `THROTTLED` error
    Throttled,
    /// Transport timeout
    Timeout,
    /// Connection or other transport failure
    Network,
    /// HTTP 5xx
    ServerError,
    /// 4xx other than 429 (bad token, missing shop, ...)
    ClientError,
    /// Body was not a GraphQL response
    MalformedResponse,
    /// Top-level GraphQL error other than throttling
    GraphqlError,
    /// Mutation returned `userErrors`
    UserError,
    /// Run was cancelled while the operation waited to retry
    Cancelled,
    /// Worker task panicked
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    /// Human-readable label used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Throttled => "Throttled",
            ErrorKind::Timeout => "Request timeout",
            ErrorKind::Network => "Network error",
            ErrorKind::ServerError => "Server error (5xx)",
            ErrorKind::ClientError => "Client error (4xx)",
            ErrorKind::MalformedResponse => "Malformed response",
            ErrorKind::GraphqlError => "GraphQL error",
            ErrorKind::UserError => "User error",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Internal => "Internal error",
        }
    }

    /// Whether another attempt might succeed.
    ///
    /// User errors and 4xx responses fail the same way every time; cancellation
    /// and panics end the operation.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Throttled
                | ErrorKind::Timeout
                | ErrorKind::Network
                | ErrorKind::ServerError
                | ErrorKind::MalformedResponse
                | ErrorKind::GraphqlError
        )
    }

    /// Whether the failure is an explicit rate-limit rejection.
    pub fn is_throttle(&self) -> bool {
        matches!(self, ErrorKind::Throttled)
    }
}
