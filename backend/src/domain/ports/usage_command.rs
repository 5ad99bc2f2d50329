//! Driving port for quota and tier mutations available to account owners.

use async_trait::async_trait;

use crate::domain::{Error, Tier, UsageInfo, UserId};

/// Domain use-case port for owner-initiated quota mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageCommand: Send + Sync {
    /// Zero the account's search counter. Returns the refreshed quota
    /// position. Idempotent; repeating it leaves the counter at zero.
    async fn reset_usage(&self, user_id: &UserId) -> Result<UsageInfo, Error>;

    /// Move the account onto another tier. The search counter is untouched;
    /// the new tier's limit applies to the existing count immediately.
    async fn change_tier(&self, user_id: &UserId, tier: Tier) -> Result<UsageInfo, Error>;
}

/// Fixture command refusing every mutation as targeting an unknown account.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUsageCommand;

#[async_trait]
impl UsageCommand for FixtureUsageCommand {
    async fn reset_usage(&self, _user_id: &UserId) -> Result<UsageInfo, Error> {
        Err(Error::not_found("account not found"))
    }

    async fn change_tier(&self, _user_id: &UserId, _tier: Tier) -> Result<UsageInfo, Error> {
        Err(Error::not_found("account not found"))
    }
}
