//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger (plain or JSON)
//! - HTTP client (timeouts, user agent)
//! - GraphQL endpoint resolution
//!
//! All initialization functions return [`InitializationError`](crate::error_handling::InitializationError).

mod client;
mod logger;

// Re-export public API
pub use client::{graphql_endpoint, init_client};
pub use logger::init_logger_with;
