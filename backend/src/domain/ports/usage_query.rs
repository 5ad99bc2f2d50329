//! Driving port for quota usage queries.
//!
//! Inbound adapters use this port to read an account's quota position and
//! search history without importing outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{Error, SearchEvent, UsageInfo, UserId};

/// Domain use-case port for reading quota usage and history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageQuery: Send + Sync {
    /// Quota position for the given account.
    async fn usage_for(&self, user_id: &UserId) -> Result<UsageInfo, Error>;

    /// Recent searches for the calling account, most recent first.
    ///
    /// Gated on the caller's tier: free accounts are refused.
    async fn history_for_owner(&self, user_id: &UserId) -> Result<Vec<SearchEvent>, Error>;
}

/// Fixture query reporting an untouched free-tier quota and no history.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUsageQuery;

#[async_trait]
impl UsageQuery for FixtureUsageQuery {
    async fn usage_for(&self, _user_id: &UserId) -> Result<UsageInfo, Error> {
        Ok(UsageInfo::anonymous())
    }

    async fn history_for_owner(&self, _user_id: &UserId) -> Result<Vec<SearchEvent>, Error> {
        Ok(Vec::new())
    }
}
