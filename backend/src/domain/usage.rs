//! Usage ledger: the quota position of an account and the owner-facing
//! operations that read or mutate it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, SearchHistoryRepository,
    SearchHistoryRepositoryError, UsageCommand, UsageQuery,
};
use crate::domain::{Account, Error, SearchEvent, SearchLimit, Tier, UserId};

/// How many of their own events an account owner may page back through.
/// Admins see full histories through their own surface.
pub const SELF_HISTORY_LIMIT: u32 = 10;

/// Snapshot of an account's quota position.
///
/// `remaining_searches` serialises as a number for finite tiers and `null`
/// for unlimited ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageInfo {
    /// Searches recorded in the current accounting period.
    pub search_count: u32,
    /// Tier the limit derives from.
    pub tier: Tier,
    /// Whether the recorded count exhausts the tier's allowance.
    pub is_limit_reached: bool,
    /// Searches still available at the recorded count.
    #[schema(value_type = Option<u32>)]
    pub remaining_searches: SearchLimit,
}

impl UsageInfo {
    /// Quota position of an account that has never searched: the free tier
    /// with an untouched counter. Served to unauthenticated callers so the
    /// landing page can render limits without a session.
    pub const fn anonymous() -> Self {
        Self {
            search_count: 0,
            tier: Tier::Free,
            is_limit_reached: false,
            remaining_searches: Tier::Free.remaining(0),
        }
    }

    /// Derive the quota position from an account row.
    pub fn for_account(account: &Account) -> Self {
        Self {
            search_count: account.search_count,
            tier: account.tier,
            is_limit_reached: account.is_limit_reached(),
            remaining_searches: account.tier.remaining(account.search_count),
        }
    }
}

/// Usage ledger service implementing the owner-facing driving ports.
#[derive(Clone)]
pub struct UsageLedger<A, H> {
    accounts: Arc<A>,
    history: Arc<H>,
}

impl<A, H> UsageLedger<A, H> {
    /// Create a new ledger over the given repositories.
    pub fn new(accounts: Arc<A>, history: Arc<H>) -> Self {
        Self { accounts, history }
    }
}

/// Map an account repository failure onto the domain error taxonomy.
pub(crate) fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
    }
}

/// Map a history repository failure onto the domain error taxonomy.
pub(crate) fn map_history_error(error: SearchHistoryRepositoryError) -> Error {
    match error {
        SearchHistoryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("search history repository unavailable: {message}"))
        }
        SearchHistoryRepositoryError::Query { message } => {
            Error::internal(format!("search history repository error: {message}"))
        }
    }
}

/// The shared refusal for operations targeting a missing account.
pub(crate) fn account_not_found() -> Error {
    Error::not_found("account not found")
}

impl<A, H> UsageLedger<A, H>
where
    A: AccountRepository,
    H: SearchHistoryRepository,
{
    async fn require_account(&self, user_id: &UserId) -> Result<Account, Error> {
        self.accounts
            .find_by_id(user_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(account_not_found)
    }
}

#[async_trait]
impl<A, H> UsageQuery for UsageLedger<A, H>
where
    A: AccountRepository,
    H: SearchHistoryRepository,
{
    async fn usage_for(&self, user_id: &UserId) -> Result<UsageInfo, Error> {
        let account = self.require_account(user_id).await?;
        Ok(UsageInfo::for_account(&account))
    }

    async fn history_for_owner(&self, user_id: &UserId) -> Result<Vec<SearchEvent>, Error> {
        let account = self.require_account(user_id).await?;
        if account.tier == Tier::Free {
            return Err(Error::forbidden("search history is a premium feature"));
        }
        self.history
            .recent_for_user(user_id, Some(SELF_HISTORY_LIMIT))
            .await
            .map_err(map_history_error)
    }
}

#[async_trait]
impl<A, H> UsageCommand for UsageLedger<A, H>
where
    A: AccountRepository,
    H: SearchHistoryRepository,
{
    async fn reset_usage(&self, user_id: &UserId) -> Result<UsageInfo, Error> {
        let matched = self
            .accounts
            .reset_search_count(user_id)
            .await
            .map_err(map_account_error)?;
        if !matched {
            return Err(account_not_found());
        }
        // Owner-initiated resets defeat the quota; keep them observable.
        warn!(user_id = %user_id, "search counter reset by account owner");
        self.usage_for(user_id).await
    }

    async fn change_tier(&self, user_id: &UserId, tier: Tier) -> Result<UsageInfo, Error> {
        let matched = self
            .accounts
            .set_tier(user_id, tier)
            .await
            .map_err(map_account_error)?;
        if !matched {
            return Err(account_not_found());
        }
        self.usage_for(user_id).await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockAccountRepository, MockSearchHistoryRepository};
    use rstest::rstest;
    use serde_json::json;

    fn account_with(tier: Tier, count: u32) -> Account {
        Account::builder(UserId::random())
            .name("Aisyah")
            .email("aisyah@example.com")
            .tier(tier)
            .search_count(count)
            .build()
    }

    fn ledger(
        accounts: MockAccountRepository,
        history: MockSearchHistoryRepository,
    ) -> UsageLedger<MockAccountRepository, MockSearchHistoryRepository> {
        UsageLedger::new(Arc::new(accounts), Arc::new(history))
    }

    #[rstest]
    #[case(Tier::Free, 0, false, json!(3))]
    #[case(Tier::Free, 3, true, json!(0))]
    #[case(Tier::Premium, 19, false, json!(1))]
    #[case(Tier::Unlimited, 10_000, false, json!(null))]
    fn usage_info_reflects_the_tier_policy(
        #[case] tier: Tier,
        #[case] count: u32,
        #[case] reached: bool,
        #[case] remaining: serde_json::Value,
    ) {
        let info = UsageInfo::for_account(&account_with(tier, count));
        assert_eq!(info.is_limit_reached, reached);

        let value = serde_json::to_value(&info).expect("serialise");
        assert_eq!(value.get("remainingSearches"), Some(&remaining));
        assert_eq!(value.get("searchCount"), Some(&json!(count)));
    }

    #[rstest]
    fn anonymous_usage_is_a_fresh_free_quota() {
        let info = UsageInfo::anonymous();
        assert_eq!(info.tier, Tier::Free);
        assert_eq!(info.search_count, 0);
        assert!(!info.is_limit_reached);
    }

    #[tokio::test]
    async fn usage_for_unknown_account_is_not_found() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_id().returning(|_| Ok(None));

        let err = ledger(accounts, MockSearchHistoryRepository::new())
            .usage_for(&UserId::random())
            .await
            .expect_err("missing account must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn history_is_refused_for_free_accounts_without_touching_the_log() {
        let account = account_with(Tier::Free, 1);
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        let mut history = MockSearchHistoryRepository::new();
        history.expect_recent_for_user().times(0);

        let err = ledger(accounts, history)
            .history_for_owner(&UserId::random())
            .await
            .expect_err("free tier has no history access");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case(Tier::Premium)]
    #[case(Tier::Unlimited)]
    #[tokio::test]
    async fn history_for_paying_accounts_is_capped(#[case] tier: Tier) {
        let account = account_with(tier, 1);
        let id = account.id.clone();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        let mut history = MockSearchHistoryRepository::new();
        history
            .expect_recent_for_user()
            .withf(|_, limit| *limit == Some(SELF_HISTORY_LIMIT))
            .returning(|_, _| Ok(Vec::new()));

        let events = ledger(accounts, history)
            .history_for_owner(&id)
            .await
            .expect("paying tiers may read history");
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn reset_zeroes_the_counter_and_reports_fresh_usage() {
        let id = UserId::random();
        let refreshed = Account::builder(id.clone()).tier(Tier::Free).build();
        let mut accounts = MockAccountRepository::new();
        accounts.expect_reset_search_count().returning(|_| Ok(true));
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(refreshed.clone())));

        let info = ledger(accounts, MockSearchHistoryRepository::new())
            .reset_usage(&id)
            .await
            .expect("reset succeeds");
        assert_eq!(info.search_count, 0);
        assert!(!info.is_limit_reached);
    }

    #[tokio::test]
    async fn reset_of_unknown_account_is_not_found() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_reset_search_count().returning(|_| Ok(false));
        accounts.expect_find_by_id().times(0);

        let err = ledger(accounts, MockSearchHistoryRepository::new())
            .reset_usage(&UserId::random())
            .await
            .expect_err("missing account must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn tier_change_keeps_the_recorded_count() {
        let id = UserId::random();
        let upgraded = Account::builder(id.clone())
            .tier(Tier::Premium)
            .search_count(3)
            .build();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_set_tier()
            .withf(|_, tier| *tier == Tier::Premium)
            .returning(|_, _| Ok(true));
        accounts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(upgraded.clone())));

        let info = ledger(accounts, MockSearchHistoryRepository::new())
            .change_tier(&id, Tier::Premium)
            .await
            .expect("tier change succeeds");
        assert_eq!(info.search_count, 3);
        assert!(!info.is_limit_reached, "premium limit applies immediately");
    }

    #[tokio::test]
    async fn connection_failures_surface_as_service_unavailable() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|_| Err(AccountRepositoryError::connection("refused")));

        let err = ledger(accounts, MockSearchHistoryRepository::new())
            .usage_for(&UserId::random())
            .await
            .expect_err("connection failure must surface");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
