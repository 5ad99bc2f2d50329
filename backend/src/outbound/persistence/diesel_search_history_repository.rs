//! PostgreSQL-backed `SearchHistoryRepository` implementation using Diesel ORM.
//!
//! The result list is stored as `jsonb` so the log captures exactly what the
//! caller saw without a join table per result.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{SearchHistoryRepository, SearchHistoryRepositoryError};
use crate::domain::{NewSearchEvent, SearchEvent, SearchResult, UserId};

use super::models::{NewSearchEventRow, SearchEventRow};
use super::pool::{DbPool, PoolError};
use super::schema::search_events;

/// Diesel-backed implementation of the `SearchHistoryRepository` port.
#[derive(Clone)]
pub struct DieselSearchHistoryRepository {
    pool: DbPool,
}

impl DieselSearchHistoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain search history repository errors.
fn map_pool_error(error: PoolError) -> SearchHistoryRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            SearchHistoryRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain search history repository errors.
fn map_diesel_error(error: diesel::result::Error) -> SearchHistoryRepositoryError {
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
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            SearchHistoryRepositoryError::connection("database connection error")
        }
        _ => SearchHistoryRepositoryError::query("database error"),
    }
}

/// Convert a database row to a domain search event.
fn row_to_event(row: SearchEventRow) -> Result<SearchEvent, SearchHistoryRepositoryError> {
    let results: Vec<SearchResult> = serde_json::from_value(row.results).map_err(|err| {
        SearchHistoryRepositoryError::query(format!("event {}: malformed results: {err}", row.id))
    })?;

    Ok(SearchEvent {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        query: row.query,
        results,
        timestamp: row.timestamp,
    })
}

#[async_trait]
impl SearchHistoryRepository for DieselSearchHistoryRepository {
    async fn append(&self, event: &NewSearchEvent) -> Result<(), SearchHistoryRepositoryError> {
        let results = serde_json::to_value(&event.results).map_err(|err| {
            SearchHistoryRepositoryError::query(format!("results not serialisable: {err}"))
        })?;
        let row = NewSearchEventRow {
            id: Uuid::new_v4(),
            user_id: *event.user_id.as_uuid(),
            query: &event.query,
            results: &results,
            timestamp: event.timestamp,
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(search_events::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn recent_for_user(
        &self,
        id: &UserId,
        limit: Option<u32>,
    ) -> Result<Vec<SearchEvent>, SearchHistoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let query = search_events::table
            .filter(search_events::user_id.eq(id.as_uuid()))
            .order(search_events::timestamp.desc())
            .select(SearchEventRow::as_select())
            .into_boxed();
        let query = match limit {
            Some(cap) => query.limit(i64::from(cap)),
            None => query,
        };

        let rows: Vec<SearchEventRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_event).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;

    fn event_row(results: serde_json::Value) -> SearchEventRow {
        SearchEventRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            query: "hukum zakat".to_owned(),
            results,
            timestamp: Utc::now(),
        }
    }

    #[rstest]
    fn rows_convert_to_domain_events() {
        let row = event_row(json!([
            { "title": "Zakat on gold", "url": "https://fatwa.example/1" }
        ]));
        let event = row_to_event(row).expect("valid row");
        assert_eq!(event.results.len(), 1);
        assert_eq!(event.results[0].title, "Zakat on gold");
    }

    #[rstest]
    fn malformed_result_payloads_are_query_errors() {
        let row = event_row(json!({ "unexpected": "shape" }));
        let err = row_to_event(row).expect_err("malformed payload must fail");
        assert!(matches!(err, SearchHistoryRepositoryError::Query { .. }));
    }

    #[rstest]
    fn empty_result_lists_round_trip() {
        let row = event_row(json!([]));
        let event = row_to_event(row).expect("valid row");
        assert!(event.results.is_empty());
    }
}
