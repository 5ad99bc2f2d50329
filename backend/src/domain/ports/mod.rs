//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod admin_operations;
mod search_dispatch;
mod search_history_repository;
mod search_provider;
mod usage_command;
mod usage_query;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{
    AccountRepository, AccountRepositoryError, AccountSort, AccountSortField, AdmissionOutcome,
    FixtureAccountRepository, SortOrder,
};
#[cfg(test)]
pub use admin_operations::MockAdminOperations;
pub use admin_operations::{AdminOperations, FixtureAdminOperations};
#[cfg(test)]
pub use search_dispatch::MockSearchDispatch;
pub use search_dispatch::{FixtureSearchDispatch, SearchDispatch, SearchOutcome};
#[cfg(test)]
pub use search_history_repository::MockSearchHistoryRepository;
pub use search_history_repository::{
    FixtureSearchHistoryRepository, SearchHistoryRepository, SearchHistoryRepositoryError,
};
#[cfg(test)]
pub use search_provider::MockSearchProvider;
pub use search_provider::{
    FixtureSearchProvider, SearchProvider, SearchProviderError, SearchResponse,
};
#[cfg(test)]
pub use usage_command::MockUsageCommand;
pub use usage_command::{FixtureUsageCommand, UsageCommand};
#[cfg(test)]
pub use usage_query::MockUsageQuery;
pub use usage_query::{FixtureUsageQuery, UsageQuery};
