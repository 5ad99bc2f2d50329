//! Outbound adapter for the external fatwa search service.

mod dto;
mod http_provider;

pub use http_provider::{
    DEFAULT_SEARCH_ENDPOINT, DEFAULT_SEARCH_TIMEOUT, HttpSearchProvider, SearchClientConfig,
    SearchClientConfigError,
};
