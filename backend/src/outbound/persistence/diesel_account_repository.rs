//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! The admission path is the interesting part: the quota check and the
//! counter increment are a single conditional `UPDATE ... RETURNING`, so the
//! database serialises concurrent admissions on the row lock and the counter
//! can never pass the tier limit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AccountSort, AccountSortField, AdmissionOutcome,
    SortOrder,
};
use crate::domain::tier::{FREE_SEARCH_LIMIT, PREMIUM_SEARCH_LIMIT};
use crate::domain::{Account, Role, Tier, UserId};

use super::models::AccountRow;
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain account repository errors.
fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            AccountRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain account repository errors.
fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => AccountRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => AccountRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            AccountRepositoryError::connection("database connection error")
        }
        _ => AccountRepositoryError::query("database error"),
    }
}

/// Convert a database row to a domain account.
///
/// Unknown tier or role strings are surfaced as query errors: treating an
/// unrecognised tier as free would silently shrink a paying user's quota.
fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let tier = row
        .tier
        .parse::<Tier>()
        .map_err(|err| AccountRepositoryError::query(format!("account {}: {err}", row.id)))?;
    let role = row
        .role
        .parse::<Role>()
        .map_err(|err| AccountRepositoryError::query(format!("account {}: {err}", row.id)))?;

    #[expect(
        clippy::cast_sign_loss,
        reason = "search_count is non-negative in the database"
    )]
    let search_count = row.search_count as u32;

    let mut builder = Account::builder(UserId::from_uuid(row.id))
        .name(row.name)
        .email(row.email)
        .tier(tier)
        .role(role)
        .search_count(search_count);
    if let Some(at) = row.last_search_date {
        builder = builder.last_search_date(at);
    }
    Ok(builder.build())
}

/// Cast a tier limit constant to the database counter type.
#[expect(
    clippy::cast_possible_wrap,
    reason = "tier limits are small constants"
)]
const fn limit_for_db(limit: u32) -> i32 {
    limit as i32
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AccountRow> = accounts::table
            .filter(accounts::id.eq(id.as_uuid()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account).transpose()
    }

    async fn list(&self, sort: AccountSort) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let query = accounts::table
            .select(AccountRow::as_select())
            .into_boxed();
        // Tiers sort lexically on their stored strings, which happens to
        // match their rank order: free < premium < unlimited.
        let query = match (sort.field, sort.order) {
            (AccountSortField::Name, SortOrder::Asc) => query.order(accounts::name.asc()),
            (AccountSortField::Name, SortOrder::Desc) => query.order(accounts::name.desc()),
            (AccountSortField::Email, SortOrder::Asc) => query.order(accounts::email.asc()),
            (AccountSortField::Email, SortOrder::Desc) => query.order(accounts::email.desc()),
            (AccountSortField::Tier, SortOrder::Asc) => query.order(accounts::tier.asc()),
            (AccountSortField::Tier, SortOrder::Desc) => query.order(accounts::tier.desc()),
            (AccountSortField::SearchCount, SortOrder::Asc) => {
                query.order(accounts::search_count.asc())
            }
            (AccountSortField::SearchCount, SortOrder::Desc) => {
                query.order(accounts::search_count.desc())
            }
        };

        let rows: Vec<AccountRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_account).collect()
    }

    async fn set_tier(&self, id: &UserId, tier: Tier) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(accounts::table.filter(accounts::id.eq(id.as_uuid())))
            .set(accounts::tier.eq(tier.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn reset_search_count(&self, id: &UserId) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(accounts::table.filter(accounts::id.eq(id.as_uuid())))
            .set(accounts::search_count.eq(0))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn admit_search(
        &self,
        id: &UserId,
        recorded_at: DateTime<Utc>,
    ) -> Result<AdmissionOutcome, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let below_limit = accounts::tier
            .eq(Tier::Unlimited.as_str())
            .or(accounts::tier
                .eq(Tier::Free.as_str())
                .and(accounts::search_count.lt(limit_for_db(FREE_SEARCH_LIMIT))))
            .or(accounts::tier
                .eq(Tier::Premium.as_str())
                .and(accounts::search_count.lt(limit_for_db(PREMIUM_SEARCH_LIMIT))));

        let admitted: Option<AccountRow> = diesel::update(
            accounts::table
                .filter(accounts::id.eq(id.as_uuid()))
                .filter(below_limit),
        )
        .set((
            accounts::search_count.eq(accounts::search_count + 1),
            accounts::last_search_date.eq(Some(recorded_at)),
        ))
        .returning(AccountRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        if let Some(row) = admitted {
            return Ok(AdmissionOutcome::Admitted(row_to_account(row)?));
        }

        // The guarded update matched nothing: either the row is missing or
        // its counter already sits at the limit.
        let current: Option<AccountRow> = accounts::table
            .filter(accounts::id.eq(id.as_uuid()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match current {
            Some(row) => Ok(AdmissionOutcome::LimitReached(row_to_account(row)?)),
            None => Ok(AdmissionOutcome::NotFound),
        }
    }
}
