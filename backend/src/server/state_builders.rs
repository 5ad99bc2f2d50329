//! Builders selecting database-backed or fixture ports for the HTTP state.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::FixtureSearchProvider;
use crate::domain::ports::SearchDispatch;
use crate::domain::{AdminService, SearchService, UsageLedger};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{DieselAccountRepository, DieselSearchHistoryRepository};
use crate::outbound::search::HttpSearchProvider;

use super::ServerConfig;

/// Build the shared HTTP state from the configured adapters.
///
/// With a database pool the usage ledger, search dispatch, and admin
/// operations all run against the SQL-backed repositories; without one every
/// port is a fixture, which keeps wiring tests honest but serves no real
/// traffic. Search dispatch additionally needs the external search client;
/// when that is absent the dispatcher runs over the fixture provider and
/// returns empty result sets.
///
/// # Errors
/// Returns [`std::io::Error`] when the search client cannot be constructed
/// from its configuration.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let Some(pool) = &config.db_pool else {
        return Ok(web::Data::new(HttpState::fixture()));
    };

    let accounts = Arc::new(DieselAccountRepository::new(pool.clone()));
    let history = Arc::new(DieselSearchHistoryRepository::new(pool.clone()));

    let search: Arc<dyn SearchDispatch> = match &config.search {
        Some(client) => {
            let provider = HttpSearchProvider::new(client.clone())
                .map_err(|err| std::io::Error::other(format!("search client: {err}")))?;
            Arc::new(SearchService::new(
                Arc::new(provider),
                accounts.clone(),
                history.clone(),
            ))
        }
        None => Arc::new(SearchService::new(
            Arc::new(FixtureSearchProvider),
            accounts.clone(),
            history.clone(),
        )),
    };

    let ledger = Arc::new(UsageLedger::new(accounts.clone(), history.clone()));
    let admin = Arc::new(AdminService::new(accounts, history));

    Ok(web::Data::new(HttpState {
        usage: ledger.clone(),
        usage_command: ledger,
        search,
        admin,
    }))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::cookie::{Key, SameSite};
    use rstest::rstest;

    use crate::domain::{SearchLimit, UserId};

    #[rstest]
    #[tokio::test]
    async fn no_database_serves_fixture_ports() {
        let config = ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            "127.0.0.1:0".parse().expect("addr"),
        );

        let state = build_http_state(&config).expect("state builds without a pool");
        let usage = state
            .usage
            .usage_for(&UserId::random())
            .await
            .expect("fixture usage query succeeds");
        assert_eq!(usage.search_count, 0);
        assert_eq!(usage.remaining_searches, SearchLimit::Limited(3));
    }
}
