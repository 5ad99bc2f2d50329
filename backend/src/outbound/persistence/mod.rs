//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! The adapters stay thin: they translate between Diesel row structs and
//! domain types and map database failures onto port errors. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) are internal and never
//! cross into the domain.

mod diesel_account_repository;
mod diesel_search_history_repository;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_search_history_repository::DieselSearchHistoryRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
