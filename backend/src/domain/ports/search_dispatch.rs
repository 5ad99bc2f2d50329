//! Driving port for quota-metered search dispatch.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, SearchQuery, SearchResult, UsageInfo, UserId};

/// Outcome of one admitted, dispatched search.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Ranked results, possibly empty.
    pub results: Vec<SearchResult>,
    /// Quota position after this search was recorded.
    pub usage: UsageInfo,
    /// Provider-reported processing time in seconds, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub processing_time: Option<f64>,
}

/// Domain use-case port for executing a search on behalf of an account.
///
/// Implementations admit the search against the caller's quota, dispatch it
/// to the external provider, and record it. A search that is refused or that
/// fails upstream must leave the counter and the history untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchDispatch: Send + Sync {
    /// Execute one search for the given account.
    async fn dispatch(&self, user_id: &UserId, query: &SearchQuery)
    -> Result<SearchOutcome, Error>;
}

/// Fixture dispatch refusing every search as targeting an unknown account.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSearchDispatch;

#[async_trait]
impl SearchDispatch for FixtureSearchDispatch {
    async fn dispatch(
        &self,
        _user_id: &UserId,
        _query: &SearchQuery,
    ) -> Result<SearchOutcome, Error> {
        Err(Error::not_found("account not found"))
    }
}
