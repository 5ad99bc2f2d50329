//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, search_events};

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub tier: String,
    pub role: String,
    pub search_count: i32,
    pub last_search_date: Option<DateTime<Utc>>,
}

/// Row struct for reading from the search_events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = search_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SearchEventRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: String,
    pub results: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Insertable struct for appending search events.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = search_events)]
pub(crate) struct NewSearchEventRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: &'a str,
    pub results: &'a serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
