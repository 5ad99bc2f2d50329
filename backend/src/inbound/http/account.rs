//! Account API handlers.
//!
//! ```text
//! POST /api/v1/login {"userId":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}
//! POST /api/v1/logout
//! PUT  /api/v1/account/tier {"tier":"premium"}
//! ```
//!
//! Identity verification happens at the edge in front of this service; login
//! here only binds the already-verified identifier to a session cookie.

use actix_web::{HttpResponse, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, Tier, UsageInfo, UserId, UserIdValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Verified account identifier to bind to the session.
    pub user_id: String,
}

/// Tier change request body for `PUT /api/v1/account/tier`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierChangeRequest {
    /// Target tier identifier: `free`, `premium`, or `unlimited`.
    pub tier: String,
}

fn map_user_id_validation_error(err: UserIdValidationError) -> Error {
    match err {
        UserIdValidationError::EmptyId => Error::invalid_request("user id must not be empty")
            .with_details(json!({ "field": "userId", "code": "empty_user_id" })),
        UserIdValidationError::InvalidId => Error::invalid_request("user id must be a valid UUID")
            .with_details(json!({ "field": "userId", "code": "invalid_user_id" })),
    }
}

pub(crate) fn parse_tier(raw: &str) -> Result<Tier, Error> {
    raw.parse::<Tier>().map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "tier", "code": "invalid_tier", "value": err.input }))
    })
}

/// Bind a verified identity to a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["account"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = UserId::new(&payload.user_id).map_err(map_user_id_validation_error)?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 200, description = "Session dropped")),
    tags = ["account"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::Ok().finish()
}

/// Move the calling account onto another tier.
///
/// The search counter is untouched; the new tier's limit applies to the
/// recorded count immediately.
#[utoipa::path(
    put,
    path = "/api/v1/account/tier",
    request_body = TierChangeRequest,
    responses(
        (status = 200, description = "Refreshed quota position", body = UsageInfo),
        (status = 400, description = "Unknown tier identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account not found", body = Error)
    ),
    tags = ["account"],
    operation_id = "changeTier"
)]
#[put("/account/tier")]
pub async fn change_tier(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<TierChangeRequest>,
) -> ApiResult<web::Json<UsageInfo>> {
    let user_id = session.require_user_id()?;
    let tier = parse_tier(&payload.tier)?;
    let info = state.usage_command.change_tier(&user_id, tier).await?;
    Ok(web::Json(info))
}
