//! Server configuration: environment-driven settings and the assembled
//! configuration object handed to [`crate::server::create_server`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::outbound::persistence::DbPool;
use crate::outbound::search::{
    DEFAULT_SEARCH_ENDPOINT, DEFAULT_SEARCH_TIMEOUT, SearchClientConfig,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Deployment settings loaded from the environment, CLI flags, or a
/// configuration file.
///
/// Every key carries the `PORTAL_` prefix in the environment, for example
/// `PORTAL_SEARCH_API_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection URL. Without it the server runs on fixture
    /// ports, which is only useful for smoke tests.
    pub database_url: Option<String>,
    /// Endpoint of the external fatwa search service.
    pub search_api_url: Option<String>,
    /// Shared secret for the search service. Required for real dispatch;
    /// startup fails when a database is configured but this is absent.
    pub search_api_key: Option<String>,
    /// Whole-request deadline for search dispatch, in seconds.
    pub search_timeout_seconds: Option<u64>,
    /// File holding the session cookie signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Whether the session cookie requires HTTPS. Disable for local HTTP
    /// development only.
    #[ortho_config(default = true, cli_default_as_absent)]
    pub cookie_secure: bool,
}

impl PortalSettings {
    /// Resolved bind address.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or_else(|| {
            DEFAULT_BIND_ADDR
                .parse()
                .expect("default bind address is valid")
        })
    }

    /// Resolved search endpoint.
    pub fn search_api_url(&self) -> &str {
        self.search_api_url
            .as_deref()
            .unwrap_or(DEFAULT_SEARCH_ENDPOINT)
    }

    /// Resolved search timeout.
    pub fn search_timeout(&self) -> Duration {
        self.search_timeout_seconds
            .map_or(DEFAULT_SEARCH_TIMEOUT, Duration::from_secs)
    }

    /// Search client settings, when an API key is configured.
    pub fn search_client(&self) -> Option<SearchClientConfig> {
        self.search_api_key
            .as_ref()
            .map(|api_key| SearchClientConfig {
                endpoint: self.search_api_url().to_owned(),
                api_key: api_key.clone(),
                timeout: self.search_timeout(),
            })
    }
}

/// Assembled configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) search: Option<SearchClientConfig>,
}

impl ServerConfig {
    /// Construct a server configuration from session and binding settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            search: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach search service connection settings.
    #[must_use]
    pub fn with_search_client(mut self, search: SearchClientConfig) -> Self {
        self.search = Some(search);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
