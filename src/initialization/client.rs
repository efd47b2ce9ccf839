//! HTTP client and endpoint initialization.

use std::time::Duration;

use reqwest::ClientBuilder;
use url::Url;

use crate::config::Config;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for every GraphQL request.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the config
/// - Per-request timeout from the config
///
/// Timeouts surface as `ErrorKind::Timeout` on the attempt, so they are retried
/// like any other transient failure.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Resolves the GraphQL endpoint for the configured shop.
///
/// An explicit `endpoint` wins; otherwise the Admin API URL is derived as
/// `https://{shop}/admin/api/{api_version}/graphql.json`. A shop given with a
/// scheme (`https://example.myshopify.com/`) is accepted.
///
/// # Errors
///
/// Returns `InitializationError::EndpointError` if the resulting URL does not parse.
pub fn graphql_endpoint(config: &Config) -> Result<Url, InitializationError> {
    let raw = match &config.endpoint {
        Some(endpoint) => endpoint.clone(),
        None => {
            let shop = config
                .shop
                .trim()
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/');
            if shop.is_empty() {
                return Err(InitializationError::EndpointError(
                    config.shop.clone(),
                    url::ParseError::EmptyHost,
                ));
            }
            format!(
                "https://{}/admin/api/{}/graphql.json",
                shop, config.api_version
            )
        }
    };

    let url = Url::parse(&raw).map_err(|e| InitializationError::EndpointError(raw, e))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(shop: &str) -> Config {
        Config {
            shop: shop.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoint_derived_from_shop() {
        let url = graphql_endpoint(&config_for("example.myshopify.com")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.myshopify.com/admin/api/2024-10/graphql.json"
        );
    }

    #[test]
    fn test_endpoint_accepts_shop_with_scheme() {
        let url = graphql_endpoint(&config_for("https://example.myshopify.com/")).unwrap();
        assert_eq!(url.host_str(), Some("example.myshopify.com"));
    }

    #[test]
    fn test_endpoint_override_wins() {
        let config = Config {
            shop: "ignored.myshopify.com".to_string(),
            endpoint: Some("http://127.0.0.1:9000/graphql".to_string()),
            ..Default::default()
        };
        let url = graphql_endpoint(&config).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/graphql");
    }

    #[test]
    fn test_endpoint_empty_shop_is_rejected() {
        let result = graphql_endpoint(&config_for(""));
        assert!(matches!(
            result,
            Err(InitializationError::EndpointError(_, _))
        ));
    }

    #[test]
    fn test_init_client_builds() {
        let config = Config::default();
        assert!(init_client(&config).is_ok());
    }
}
