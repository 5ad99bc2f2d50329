//! Reqwest-backed fatwa search provider adapter.
//!
//! Owns transport details only: request serialisation, the API key header,
//! timeout and status mapping, and payload normalisation into the domain
//! response.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::json;
use tracing::warn;

use crate::domain::SearchQuery;
use crate::domain::ports::{SearchProvider, SearchProviderError, SearchResponse};

use super::dto::normalise_payload;

/// Endpoint used when the deployment does not configure one.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "http://localhost:8000/search";
/// Request deadline used when the deployment does not configure one.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the shared secret to the search service.
const API_KEY_HEADER: &str = "X-API-Key";

/// Errors raised while constructing the search client.
///
/// A missing API key is a deployment mistake and must stop startup: without
/// it every search would fail at runtime with an opaque upstream refusal.
#[derive(Debug, thiserror::Error)]
pub enum SearchClientConfigError {
    /// No API key was configured.
    #[error("search service API key is not configured")]
    MissingApiKey,
    /// The endpoint string is not a valid URL.
    #[error("search service endpoint is not a valid URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build search HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for the search service.
#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    /// Endpoint the query is POSTed to.
    pub endpoint: String,
    /// Shared secret sent in the [`API_KEY_HEADER`] header.
    pub api_key: String,
    /// Whole-request deadline.
    pub timeout: Duration,
}

/// Search provider adapter performing HTTP POST requests against one endpoint.
#[derive(Debug)]
pub struct HttpSearchProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HttpSearchProvider {
    /// Build an adapter from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`SearchClientConfigError::MissingApiKey`] when the key is
    /// blank, and endpoint or client construction failures otherwise.
    pub fn new(config: SearchClientConfig) -> Result<Self, SearchClientConfigError> {
        let api_key = config.api_key.trim().to_owned();
        if api_key.is_empty() {
            return Err(SearchClientConfigError::MissingApiKey);
        }
        let endpoint = Url::parse(&config.endpoint)?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> SearchProviderError {
    if error.is_timeout() {
        SearchProviderError::timeout(error.to_string())
    } else {
        SearchProviderError::transport(error.to_string())
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchProviderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&json!({ "query": query.as_str() }))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchProviderError::upstream(status.as_u16()));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        let payload: serde_json::Value = match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(err) => {
                // A 2xx with an undecodable body is treated like any other
                // unrecognised shape: no results.
                warn!(error = %err, "search service sent a non-JSON body");
                return Ok(SearchResponse::default());
            }
        };

        Ok(normalise_payload(payload))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn config(api_key: &str) -> SearchClientConfig {
        SearchClientConfig {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_owned(),
            api_key: api_key.to_owned(),
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_api_keys_are_refused(#[case] api_key: &str) {
        let err = HttpSearchProvider::new(config(api_key)).expect_err("blank key must fail");
        assert!(matches!(err, SearchClientConfigError::MissingApiKey));
    }

    #[rstest]
    fn malformed_endpoints_are_refused() {
        let mut cfg = config("secret");
        cfg.endpoint = "not a url".to_owned();
        let err = HttpSearchProvider::new(cfg).expect_err("bad endpoint must fail");
        assert!(matches!(err, SearchClientConfigError::InvalidEndpoint(_)));
    }

    #[rstest]
    fn valid_settings_build_a_provider() {
        let provider = HttpSearchProvider::new(config("secret")).expect("valid settings");
        assert_eq!(provider.api_key, "secret");
        assert_eq!(provider.endpoint.as_str(), DEFAULT_SEARCH_ENDPOINT);
    }
}
