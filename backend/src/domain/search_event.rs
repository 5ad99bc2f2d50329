//! Search events and the validated query type.
//!
//! A search event is the immutable record of one executed query: created
//! exactly once per admitted, successfully dispatched search and never
//! mutated afterwards. Retention is an external concern.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Longest query text accepted from callers.
pub const QUERY_MAX_CHARS: usize = 500;

/// Validation errors returned by [`SearchQuery::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQueryValidationError {
    /// Query was blank once trimmed.
    Empty,
    /// Query exceeded [`QUERY_MAX_CHARS`].
    TooLong {
        /// The configured maximum.
        max: usize,
    },
}

impl fmt::Display for SearchQueryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "query must not be empty"),
            Self::TooLong { max } => write!(f, "query must be at most {max} characters"),
        }
    }
}

impl std::error::Error for SearchQueryValidationError {}

/// Validated free-text query submitted by a caller.
///
/// ## Invariants
/// - Trimmed of surrounding whitespace and non-empty.
/// - At most [`QUERY_MAX_CHARS`] characters.
///
/// # Examples
/// ```
/// use backend::domain::SearchQuery;
///
/// let query = SearchQuery::new("  hukum zakat emas ").expect("valid query");
/// assert_eq!(query.as_str(), "hukum zakat emas");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Validate and construct a query from caller input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SearchQueryValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SearchQueryValidationError::Empty);
        }
        if trimmed.chars().count() > QUERY_MAX_CHARS {
            return Err(SearchQueryValidationError::TooLong {
                max: QUERY_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the query text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for SearchQuery {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked result returned by the external search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Result title.
    pub title: String,
    /// Link to the source document.
    pub url: String,
}

/// Immutable record of one executed search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    /// Event identifier.
    pub id: Uuid,
    /// Account the search was recorded against.
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    /// Query text as submitted.
    pub query: String,
    /// Results returned for the query, in rank order.
    pub results: Vec<SearchResult>,
    /// Creation time; immutable after insert.
    pub timestamp: DateTime<Utc>,
}

/// Payload for appending a new search event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSearchEvent {
    /// Account the search is recorded against.
    pub user_id: UserId,
    /// Query text as submitted.
    pub query: String,
    /// Results returned for the query, in rank order.
    pub results: Vec<SearchResult>,
    /// Creation time stamped by the ledger.
    pub timestamp: DateTime<Utc>,
}

impl NewSearchEvent {
    /// Build an append payload for the given account and query.
    pub fn new(user_id: UserId, query: &SearchQuery, results: Vec<SearchResult>) -> Self {
        Self {
            user_id,
            query: query.as_str().to_owned(),
            results,
            timestamp: Utc::now(),
        }
    }
}
