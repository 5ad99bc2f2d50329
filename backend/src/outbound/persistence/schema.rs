//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Portal accounts with their quota counters.
    ///
    /// The `id` column is the primary key (UUID v4). `tier` and `role` store
    /// the lowercase string forms of the domain enums; unrecognised values
    /// are read errors, never silent defaults.
    accounts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name shown in the admin table.
        name -> Varchar,
        /// Contact address supplied by the identity provider.
        email -> Varchar,
        /// Subscription tier: free, premium, or unlimited.
        tier -> Varchar,
        /// Capability role: member or admin.
        role -> Varchar,
        /// Searches recorded in the current accounting period.
        search_count -> Int4,
        /// Timestamp of the most recent recorded search.
        last_search_date -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only log of executed searches.
    search_events (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Account the search was recorded against.
        user_id -> Uuid,
        /// Query text as submitted.
        query -> Text,
        /// Result list captured at dispatch time.
        results -> Jsonb,
        /// Creation time; immutable after insert.
        timestamp -> Timestamptz,
    }
}

diesel::joinable!(search_events -> accounts (user_id));
diesel::allow_tables_to_appear_in_same_query!(accounts, search_events);
