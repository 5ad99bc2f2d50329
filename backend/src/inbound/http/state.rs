//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AdminOperations, FixtureAdminOperations, FixtureSearchDispatch, FixtureUsageCommand,
    FixtureUsageQuery, SearchDispatch, UsageCommand, UsageQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Quota position and self-service history reads.
    pub usage: Arc<dyn UsageQuery>,
    /// Owner-initiated quota and tier mutations.
    pub usage_command: Arc<dyn UsageCommand>,
    /// Quota-metered search dispatch.
    pub search: Arc<dyn SearchDispatch>,
    /// Privileged account management.
    pub admin: Arc<dyn AdminOperations>,
}

impl HttpState {
    /// State backed entirely by fixture ports, for wiring tests and running
    /// without a database.
    pub fn fixture() -> Self {
        Self {
            usage: Arc::new(FixtureUsageQuery),
            usage_command: Arc::new(FixtureUsageCommand),
            search: Arc::new(FixtureSearchDispatch),
            admin: Arc::new(FixtureAdminOperations),
        }
    }
}
