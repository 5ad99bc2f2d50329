//! Backend entry-point: loads configuration and starts the HTTP server.

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use ortho_config::OrthoConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::server::{PortalSettings, ServerConfig, create_server};

const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = PortalSettings::load()
        .map_err(|e| std::io::Error::other(format!("configuration failed to load: {e}")))?;

    let key_path = settings
        .session_key_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE));
    let key = load_session_key(&key_path)?;

    let mut config = ServerConfig::new(
        key,
        settings.cookie_secure,
        SameSite::Lax,
        settings.bind_addr(),
    );

    if let Some(database_url) = &settings.database_url {
        let pool = DbPool::new(PoolConfig::new(database_url.clone()))
            .await
            .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
        config = config.with_db_pool(pool);

        // A database without a search client would meter quota against a
        // provider that returns nothing. Refuse to start half-configured.
        let search = settings.search_client().ok_or_else(|| {
            std::io::Error::other("PORTAL_SEARCH_API_KEY is required when a database is configured")
        })?;
        config = config.with_search_client(search);
    } else {
        warn!("no database configured; serving fixture data only");
    }

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "portal backend listening");
    server.await
}

/// Read the session cookie signing key, falling back to an ephemeral key in
/// development builds or when `SESSION_ALLOW_EPHEMERAL=1` is set.
fn load_session_key(path: &Path) -> std::io::Result<Key> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev =
                std::env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {e}",
                    path.display()
                )))
            }
        }
    }
}
