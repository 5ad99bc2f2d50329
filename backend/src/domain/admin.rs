//! Privileged account management.
//!
//! Every operation resolves the calling account and checks its role before
//! touching any target data. A caller without the admin role learns nothing
//! about the target, not even whether it exists.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    AccountRepository, AccountSort, AdminOperations, SearchHistoryRepository,
};
use crate::domain::usage::{account_not_found, map_account_error, map_history_error};
use crate::domain::{Account, Error, SearchEvent, Tier, UserId};

/// Admin service implementing the privileged driving port.
#[derive(Clone)]
pub struct AdminService<A, H> {
    accounts: Arc<A>,
    history: Arc<H>,
}

impl<A, H> AdminService<A, H> {
    /// Create a new service over the given repositories.
    pub fn new(accounts: Arc<A>, history: Arc<H>) -> Self {
        Self { accounts, history }
    }
}

impl<A, H> AdminService<A, H>
where
    A: AccountRepository,
    H: SearchHistoryRepository,
{
    /// Refuse callers without the admin role. Unknown callers receive the
    /// same refusal as known non-admins.
    async fn require_admin(&self, caller: &UserId) -> Result<Account, Error> {
        let refusal = || Error::forbidden("admin access required");
        let account = self
            .accounts
            .find_by_id(caller)
            .await
            .map_err(map_account_error)?
            .ok_or_else(refusal)?;
        if !account.is_admin() {
            return Err(refusal());
        }
        Ok(account)
    }

    async fn require_target(&self, target: &UserId) -> Result<Account, Error> {
        self.accounts
            .find_by_id(target)
            .await
            .map_err(map_account_error)?
            .ok_or_else(account_not_found)
    }
}

#[async_trait]
impl<A, H> AdminOperations for AdminService<A, H>
where
    A: AccountRepository,
    H: SearchHistoryRepository,
{
    async fn list_accounts(
        &self,
        caller: &UserId,
        sort: AccountSort,
    ) -> Result<Vec<Account>, Error> {
        self.require_admin(caller).await?;
        self.accounts.list(sort).await.map_err(map_account_error)
    }

    async fn set_tier(
        &self,
        caller: &UserId,
        target: &UserId,
        tier: Tier,
    ) -> Result<Account, Error> {
        self.require_admin(caller).await?;
        let matched = self
            .accounts
            .set_tier(target, tier)
            .await
            .map_err(map_account_error)?;
        if !matched {
            return Err(account_not_found());
        }
        info!(admin = %caller, target = %target, tier = %tier, "tier overridden");
        self.require_target(target).await
    }

    async fn reset_count(&self, caller: &UserId, target: &UserId) -> Result<Account, Error> {
        self.require_admin(caller).await?;
        let matched = self
            .accounts
            .reset_search_count(target)
            .await
            .map_err(map_account_error)?;
        if !matched {
            return Err(account_not_found());
        }
        info!(admin = %caller, target = %target, "search counter reset");
        self.require_target(target).await
    }

    async fn account_history(
        &self,
        caller: &UserId,
        target: &UserId,
    ) -> Result<Vec<SearchEvent>, Error> {
        self.require_admin(caller).await?;
        // The target's tier does not gate the admin view; only its existence.
        self.require_target(target).await?;
        self.history
            .recent_for_user(target, None)
            .await
            .map_err(map_history_error)
    }
}
