//! Port for the append-only search event log.

use async_trait::async_trait;

use crate::domain::{NewSearchEvent, SearchEvent, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by search history repository adapters.
    pub enum SearchHistoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "search history repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "search history repository query failed: {message}",
    }
}

/// Persistence port for search events.
///
/// Events are append-only: this port exposes no update or delete. Retention
/// policy belongs to an external process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchHistoryRepository: Send + Sync {
    /// Append one event to the log.
    async fn append(&self, event: &NewSearchEvent) -> Result<(), SearchHistoryRepositoryError>;

    /// Events for one account, most recent first, optionally capped.
    async fn recent_for_user(
        &self,
        id: &UserId,
        limit: Option<u32>,
    ) -> Result<Vec<SearchEvent>, SearchHistoryRepositoryError>;
}

/// Fixture implementation that discards appends and returns no history.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSearchHistoryRepository;

#[async_trait]
impl SearchHistoryRepository for FixtureSearchHistoryRepository {
    async fn append(&self, _event: &NewSearchEvent) -> Result<(), SearchHistoryRepositoryError> {
        Ok(())
    }

    async fn recent_for_user(
        &self,
        _id: &UserId,
        _limit: Option<u32>,
    ) -> Result<Vec<SearchEvent>, SearchHistoryRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::SearchQuery;

    #[tokio::test]
    async fn fixture_repository_discards_appends() {
        let repo = FixtureSearchHistoryRepository;
        let query = SearchQuery::new("puasa").expect("valid query");
        let event = NewSearchEvent::new(UserId::random(), &query, Vec::new());

        repo.append(&event).await.expect("fixture append succeeds");
        let history = repo
            .recent_for_user(&event.user_id, None)
            .await
            .expect("fixture read succeeds");
        assert!(history.is_empty());
    }
}
