//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: every endpoint from the inbound layer, the shared error
//! schema, and the session cookie security scheme.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Fatwa search portal API",
        description = "Quota-metered fatwa search with tier accounting and \
                       admin account management."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::account::login,
        crate::inbound::http::account::logout,
        crate::inbound::http::account::change_tier,
        crate::inbound::http::search::search,
        crate::inbound::http::search::usage,
        crate::inbound::http::search::history,
        crate::inbound::http::search::reset,
        crate::inbound::http::admin::list_accounts,
        crate::inbound::http::admin::set_tier,
        crate::inbound::http::admin::reset_count,
        crate::inbound::http::admin::account_history,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Account,
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::Role,
        crate::domain::SearchEvent,
        crate::domain::SearchResult,
        crate::domain::Tier,
        crate::domain::UsageInfo,
        crate::domain::ports::SearchOutcome,
        crate::inbound::http::account::LoginRequest,
        crate::inbound::http::account::TierChangeRequest,
        crate::inbound::http::search::SearchRequest,
    ))
)]
pub struct ApiDoc;
