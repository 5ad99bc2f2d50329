//! Quota-metered search dispatch.
//!
//! The service sits between the caller's quota and the external fatwa search
//! provider. A search runs in three steps: check the caller's quota, dispatch
//! the query upstream, then admit and record the search. The admission is one
//! conditional counter update, so two concurrent searches can never both
//! consume the last slot; the up-front check merely refuses obviously
//! exhausted callers before any network traffic.
//!
//! Ordering matters for failures: the provider is called before the counter
//! moves, so an upstream outage never burns quota, and a search that fails to
//! be admitted afterwards is reported as exhausted without appending history.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{
    AccountRepository, AdmissionOutcome, SearchDispatch, SearchHistoryRepository, SearchOutcome,
    SearchProvider, SearchProviderError, SearchResponse,
};
use crate::domain::usage::{account_not_found, map_account_error, map_history_error};
use crate::domain::{Account, Error, NewSearchEvent, SearchQuery, UsageInfo, UserId};

/// Message returned when a caller's quota is exhausted.
const QUOTA_EXHAUSTED_MESSAGE: &str = "search limit reached; upgrade your plan to keep searching";

/// Search service implementing the dispatch driving port.
#[derive(Clone)]
pub struct SearchService<P, A, H> {
    provider: Arc<P>,
    accounts: Arc<A>,
    history: Arc<H>,
}

impl<P, A, H> SearchService<P, A, H> {
    /// Create a new service over the given provider and repositories.
    pub fn new(provider: Arc<P>, accounts: Arc<A>, history: Arc<H>) -> Self {
        Self {
            provider,
            accounts,
            history,
        }
    }
}

fn quota_exhausted(account: &Account) -> Error {
    Error::quota_exceeded(QUOTA_EXHAUSTED_MESSAGE).with_details(serde_json::json!({
        "tier": account.tier,
        "searchCount": account.search_count,
        "limit": account.tier.search_limit().finite(),
    }))
}

fn map_provider_error(error: SearchProviderError) -> Error {
    match error {
        SearchProviderError::Upstream { status } => {
            Error::service_unavailable(format!("search service returned status {status}"))
        }
        SearchProviderError::Timeout { message } => {
            Error::service_unavailable(format!("search service timed out: {message}"))
        }
        SearchProviderError::Transport { message } => {
            Error::service_unavailable(format!("search service unreachable: {message}"))
        }
    }
}

impl<P, A, H> SearchService<P, A, H>
where
    P: SearchProvider,
    A: AccountRepository,
    H: SearchHistoryRepository,
{
    async fn check_quota(&self, user_id: &UserId) -> Result<Account, Error> {
        let account = self
            .accounts
            .find_by_id(user_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(account_not_found)?;
        if account.is_limit_reached() {
            return Err(quota_exhausted(&account));
        }
        Ok(account)
    }

    async fn run_query(&self, query: &SearchQuery) -> Result<SearchResponse, Error> {
        self.provider.search(query).await.map_err(|err| {
            warn!(error = %err, "search provider dispatch failed");
            map_provider_error(err)
        })
    }

    async fn admit_and_record(
        &self,
        user_id: &UserId,
        query: &SearchQuery,
        response: SearchResponse,
    ) -> Result<SearchOutcome, Error> {
        let event = NewSearchEvent::new(user_id.clone(), query, response.results);
        let outcome = self
            .accounts
            .admit_search(user_id, event.timestamp)
            .await
            .map_err(map_account_error)?;

        match outcome {
            AdmissionOutcome::Admitted(account) => {
                self.history.append(&event).await.map_err(map_history_error)?;
                debug!(
                    user_id = %user_id,
                    search_count = account.search_count,
                    "search recorded"
                );
                Ok(SearchOutcome {
                    results: event.results,
                    usage: UsageInfo::for_account(&account),
                    processing_time: response.processing_time,
                })
            }
            // A concurrent search took the last slot between the up-front
            // check and the admission.
            AdmissionOutcome::LimitReached(account) => Err(quota_exhausted(&account)),
            AdmissionOutcome::NotFound => Err(account_not_found()),
        }
    }
}

#[async_trait]
impl<P, A, H> SearchDispatch for SearchService<P, A, H>
where
    P: SearchProvider,
    A: AccountRepository,
    H: SearchHistoryRepository,
{
    async fn dispatch(
        &self,
        user_id: &UserId,
        query: &SearchQuery,
    ) -> Result<SearchOutcome, Error> {
        self.check_quota(user_id).await?;
        let response = self.run_query(query).await?;
        self.admit_and_record(user_id, query, response).await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        MockAccountRepository, MockSearchHistoryRepository, MockSearchProvider,
    };
    use crate::domain::{ErrorCode, SearchResult, Tier};
    use rstest::rstest;

    fn account_with(tier: Tier, count: u32) -> Account {
        Account::builder(UserId::random())
            .name("Hafiz")
            .email("hafiz@example.com")
            .tier(tier)
            .search_count(count)
            .build()
    }

    fn sample_results() -> Vec<SearchResult> {
        vec![SearchResult {
            title: "Hukum zakat emas".to_owned(),
            url: "https://fatwa.example/zakat-emas".to_owned(),
        }]
    }

    fn service(
        provider: MockSearchProvider,
        accounts: MockAccountRepository,
        history: MockSearchHistoryRepository,
    ) -> SearchService<MockSearchProvider, MockAccountRepository, MockSearchHistoryRepository>
    {
        SearchService::new(Arc::new(provider), Arc::new(accounts), Arc::new(history))
    }

    fn query() -> SearchQuery {
        SearchQuery::new("hukum zakat emas").expect("valid query")
    }

    #[tokio::test]
    async fn admitted_search_returns_results_and_the_incremented_usage() {
        let account = account_with(Tier::Free, 1);
        let id = account.id.clone();
        let admitted = Account {
            search_count: 2,
            ..account.clone()
        };

        let mut provider = MockSearchProvider::new();
        provider.expect_search().returning(|_| {
            Ok(SearchResponse {
                results: sample_results(),
                query: None,
                processing_time: Some(0.042),
            })
        });
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        accounts
            .expect_admit_search()
            .returning(move |_, _| Ok(AdmissionOutcome::Admitted(admitted.clone())));
        let mut history = MockSearchHistoryRepository::new();
        history
            .expect_append()
            .withf(|event| event.query == "hukum zakat emas" && event.results.len() == 1)
            .times(1)
            .returning(|_| Ok(()));

        let outcome = service(provider, accounts, history)
            .dispatch(&id, &query())
            .await
            .expect("search admitted");

        assert_eq!(outcome.results, sample_results());
        assert_eq!(outcome.usage.search_count, 2);
        assert_eq!(outcome.processing_time, Some(0.042));
    }

    #[rstest]
    #[case(Tier::Free, 3)]
    #[case(Tier::Premium, 20)]
    #[tokio::test]
    async fn exhausted_quota_is_refused_before_any_dispatch(
        #[case] tier: Tier,
        #[case] count: u32,
    ) {
        let account = account_with(tier, count);
        let id = account.id.clone();

        let mut provider = MockSearchProvider::new();
        provider.expect_search().times(0);
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        accounts.expect_admit_search().times(0);
        let mut history = MockSearchHistoryRepository::new();
        history.expect_append().times(0);

        let err = service(provider, accounts, history)
            .dispatch(&id, &query())
            .await
            .expect_err("exhausted quota must refuse");
        assert_eq!(err.code(), ErrorCode::QuotaExceeded);
    }

    #[tokio::test]
    async fn unlimited_accounts_are_never_refused() {
        let account = account_with(Tier::Unlimited, 1_000_000);
        let id = account.id.clone();
        let admitted = Account {
            search_count: 1_000_001,
            ..account.clone()
        };

        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .returning(|_| Ok(SearchResponse::default()));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        accounts
            .expect_admit_search()
            .returning(move |_, _| Ok(AdmissionOutcome::Admitted(admitted.clone())));
        let mut history = MockSearchHistoryRepository::new();
        history.expect_append().returning(|_| Ok(()));

        let outcome = service(provider, accounts, history)
            .dispatch(&id, &query())
            .await
            .expect("unlimited tier is always admitted");
        assert!(!outcome.usage.is_limit_reached);
    }

    #[rstest]
    #[case(SearchProviderError::upstream(500_u16))]
    #[case(SearchProviderError::timeout("deadline exceeded"))]
    #[case(SearchProviderError::transport("connection refused"))]
    #[tokio::test]
    async fn upstream_failures_consume_no_quota(#[case] error: SearchProviderError) {
        let account = account_with(Tier::Free, 0);
        let id = account.id.clone();

        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .returning(move |_| Err(error.clone()));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        accounts.expect_admit_search().times(0);
        let mut history = MockSearchHistoryRepository::new();
        history.expect_append().times(0);

        let err = service(provider, accounts, history)
            .dispatch(&id, &query())
            .await
            .expect_err("upstream failure must surface");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn concurrent_exhaustion_is_refused_without_recording_history() {
        let account = account_with(Tier::Free, 2);
        let id = account.id.clone();
        let exhausted = Account {
            search_count: 3,
            ..account.clone()
        };

        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .returning(|_| Ok(SearchResponse::default()));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        accounts
            .expect_admit_search()
            .returning(move |_, _| Ok(AdmissionOutcome::LimitReached(exhausted.clone())));
        let mut history = MockSearchHistoryRepository::new();
        history.expect_append().times(0);

        let err = service(provider, accounts, history)
            .dispatch(&id, &query())
            .await
            .expect_err("racing searches must not overrun the limit");
        assert_eq!(err.code(), ErrorCode::QuotaExceeded);
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let mut provider = MockSearchProvider::new();
        provider.expect_search().times(0);
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_id().returning(|_| Ok(None));

        let err = service(provider, accounts, MockSearchHistoryRepository::new())
            .dispatch(&UserId::random(), &query())
            .await
            .expect_err("unknown account must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn quota_errors_carry_the_limit_details() {
        let account = account_with(Tier::Free, 3);
        let id = account.id.clone();

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));

        let err = service(
            MockSearchProvider::new(),
            accounts,
            MockSearchHistoryRepository::new(),
        )
        .dispatch(&id, &query())
        .await
        .expect_err("exhausted quota must refuse");

        let details = err.details().expect("details attached");
        assert_eq!(details.get("limit"), Some(&serde_json::json!(3)));
        assert_eq!(details.get("searchCount"), Some(&serde_json::json!(3)));
    }
}
