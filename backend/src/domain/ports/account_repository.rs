//! Port for account persistence, including the atomic admission update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Account, Tier, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "account repository query failed: {message}",
    }
}

/// Field the admin account listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountSortField {
    /// Display name (the fallback for unrecognised input).
    #[default]
    Name,
    /// Contact address.
    Email,
    /// Subscription tier.
    Tier,
    /// Recorded search count.
    SearchCount,
}

impl AccountSortField {
    /// Parse a caller-supplied field name; `None` for unrecognised input so
    /// the caller can apply its documented fallback.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "tier" => Some(Self::Tier),
            "searchCount" => Some(Self::SearchCount),
            _ => None,
        }
    }
}

/// Listing order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending (the fallback for unrecognised input).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Ordering applied to an account listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountSort {
    /// Field to order by.
    pub field: AccountSortField,
    /// Direction to order in.
    pub order: SortOrder,
}

/// Outcome of the conditional admission update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Counter was below the tier limit; the returned account reflects the
    /// post-increment state.
    Admitted(Account),
    /// Counter already met the tier limit; nothing was mutated. The returned
    /// account reflects the unchanged state.
    LimitReached(Account),
    /// No account row exists for the identifier.
    NotFound,
}

/// Persistence port for account rows.
///
/// # Admission semantics
///
/// [`AccountRepository::admit_search`] performs the quota check and the
/// counter increment as ONE conditional update scoped to the account row: the
/// row is incremented only while its pre-update count is below its tier's
/// limit. Concurrent admissions for the same account therefore cannot both
/// pass a stale check and push the counter past the limit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountRepositoryError>;

    /// List every account in the given order. No pagination; the admin table
    /// receives the full set.
    async fn list(&self, sort: AccountSort) -> Result<Vec<Account>, AccountRepositoryError>;

    /// Overwrite an account's tier. Returns `false` when no row matched.
    async fn set_tier(&self, id: &UserId, tier: Tier) -> Result<bool, AccountRepositoryError>;

    /// Zero an account's search counter. Returns `false` when no row matched.
    /// Safe to repeat; a second call leaves the counter at zero.
    async fn reset_search_count(&self, id: &UserId) -> Result<bool, AccountRepositoryError>;

    /// Conditionally admit one search: increment the counter and stamp
    /// `last_search_date` only if the pre-update count is below the tier
    /// limit.
    async fn admit_search(
        &self,
        id: &UserId,
        recorded_at: DateTime<Utc>,
    ) -> Result<AdmissionOutcome, AccountRepositoryError>;
}

/// Fixture implementation for wiring without a real database.
///
/// Behaves as an empty account table: lookups miss, mutations match nothing,
/// and admissions report [`AdmissionOutcome::NotFound`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountRepository;

#[async_trait]
impl AccountRepository for FixtureAccountRepository {
    async fn find_by_id(&self, _id: &UserId) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(None)
    }

    async fn list(&self, _sort: AccountSort) -> Result<Vec<Account>, AccountRepositoryError> {
        Ok(Vec::new())
    }

    async fn set_tier(&self, _id: &UserId, _tier: Tier) -> Result<bool, AccountRepositoryError> {
        Ok(false)
    }

    async fn reset_search_count(&self, _id: &UserId) -> Result<bool, AccountRepositoryError> {
        Ok(false)
    }

    async fn admit_search(
        &self,
        _id: &UserId,
        _recorded_at: DateTime<Utc>,
    ) -> Result<AdmissionOutcome, AccountRepositoryError> {
        Ok(AdmissionOutcome::NotFound)
    }
}
