//! Driving port for the admin account-management surface.
//!
//! Every operation takes the calling account's identifier and checks its
//! capability before touching any target data: a caller without the admin
//! role is refused up front, and the refusal never discloses whether the
//! target exists.

use async_trait::async_trait;

use crate::domain::{Account, Error, SearchEvent, Tier, UserId};

use super::AccountSort;

/// Domain use-case port for privileged account management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminOperations: Send + Sync {
    /// List every account in the requested order.
    async fn list_accounts(
        &self,
        caller: &UserId,
        sort: AccountSort,
    ) -> Result<Vec<Account>, Error>;

    /// Overwrite a target account's tier.
    async fn set_tier(&self, caller: &UserId, target: &UserId, tier: Tier)
    -> Result<Account, Error>;

    /// Zero a target account's search counter. Idempotent.
    async fn reset_count(&self, caller: &UserId, target: &UserId) -> Result<Account, Error>;

    /// Full search history of a target account, most recent first.
    async fn account_history(
        &self,
        caller: &UserId,
        target: &UserId,
    ) -> Result<Vec<SearchEvent>, Error>;
}

/// Fixture operations refusing every caller as lacking the admin role.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAdminOperations;

impl FixtureAdminOperations {
    fn refuse<T>() -> Result<T, Error> {
        Err(Error::forbidden("admin access required"))
    }
}

#[async_trait]
impl AdminOperations for FixtureAdminOperations {
    async fn list_accounts(
        &self,
        _caller: &UserId,
        _sort: AccountSort,
    ) -> Result<Vec<Account>, Error> {
        Self::refuse()
    }

    async fn set_tier(
        &self,
        _caller: &UserId,
        _target: &UserId,
        _tier: Tier,
    ) -> Result<Account, Error> {
        Self::refuse()
    }

    async fn reset_count(&self, _caller: &UserId, _target: &UserId) -> Result<Account, Error> {
        Self::refuse()
    }

    async fn account_history(
        &self,
        _caller: &UserId,
        _target: &UserId,
    ) -> Result<Vec<SearchEvent>, Error> {
        Self::refuse()
    }
}
