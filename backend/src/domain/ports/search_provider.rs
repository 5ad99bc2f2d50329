//! Port for the external fatwa search service.

use async_trait::async_trait;

use crate::domain::{SearchQuery, SearchResult};

use super::define_port_error;

define_port_error! {
    /// Errors raised by search provider adapters.
    pub enum SearchProviderError {
        /// Provider answered with a non-success status.
        Upstream { status: u16 } =>
            "search provider returned status {status}",
        /// Provider did not answer within the configured deadline.
        Timeout { message: String } =>
            "search provider timed out: {message}",
        /// Request could not be delivered at all.
        Transport { message: String } =>
            "search provider transport failed: {message}",
    }
}

/// A successful answer from the search provider.
///
/// Adapters normalise whatever shape the provider sends into this struct;
/// an unrecognised payload becomes an empty result list, never an error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    /// Ranked results, possibly empty.
    pub results: Vec<SearchResult>,
    /// Query text echoed by the provider, when present.
    pub query: Option<String>,
    /// Provider-reported processing time in seconds, when present.
    pub processing_time: Option<f64>,
}

/// Outbound port for dispatching a query to the search service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Execute one query against the provider.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchProviderError>;
}

/// Fixture provider that answers every query with no results.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSearchProvider;

#[async_trait]
impl SearchProvider for FixtureSearchProvider {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchProviderError> {
        Ok(SearchResponse {
            results: Vec::new(),
            query: Some(query.as_str().to_owned()),
            processing_time: None,
        })
    }
}
