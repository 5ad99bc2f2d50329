//! Search API handlers.
//!
//! ```text
//! POST /api/v1/search {"query":"hukum zakat emas"}
//! GET  /api/v1/search/usage
//! GET  /api/v1/search/history
//! POST /api/v1/search/reset
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::SearchOutcome;
use crate::domain::{
    Error, ErrorCode, SearchEvent, SearchQuery, SearchQueryValidationError, UsageInfo,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Search request body for `POST /api/v1/search`.
///
/// Example JSON: `{"query":"hukum zakat emas"}`
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Free-text query to dispatch.
    pub query: String,
}

fn map_query_validation_error(err: SearchQueryValidationError) -> Error {
    match err {
        SearchQueryValidationError::Empty => Error::invalid_request("query must not be empty")
            .with_details(json!({ "field": "query", "code": "empty_query" })),
        SearchQueryValidationError::TooLong { max } => {
            Error::invalid_request(format!("query must be at most {max} characters"))
                .with_details(json!({ "field": "query", "code": "query_too_long", "max": max }))
        }
    }
}

/// Execute a quota-metered search for the authenticated account.
#[utoipa::path(
    post,
    path = "/api/v1/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search results and the updated quota", body = SearchOutcome),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account not found", body = Error),
        (status = 429, description = "Quota exhausted", body = Error),
        (status = 503, description = "Search service unavailable", body = Error)
    ),
    tags = ["search"],
    operation_id = "search"
)]
#[post("/search")]
pub async fn search(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<SearchRequest>,
) -> ApiResult<web::Json<SearchOutcome>> {
    let user_id = session.require_user_id()?;
    let query = SearchQuery::new(&payload.query).map_err(map_query_validation_error)?;
    let outcome = state.search.dispatch(&user_id, &query).await?;
    Ok(web::Json(outcome))
}

/// Quota position for the calling account.
///
/// Unauthenticated callers, and authenticated callers whose account row has
/// not been provisioned yet, receive the untouched free-tier position so the
/// landing page can always render limits.
#[utoipa::path(
    get,
    path = "/api/v1/search/usage",
    responses(
        (status = 200, description = "Quota position", body = UsageInfo),
        (status = 503, description = "Account store unavailable", body = Error)
    ),
    tags = ["search"],
    operation_id = "getUsage",
    security([])
)]
#[get("/search/usage")]
pub async fn usage(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UsageInfo>> {
    let Some(user_id) = session.user_id()? else {
        return Ok(web::Json(UsageInfo::anonymous()));
    };
    match state.usage.usage_for(&user_id).await {
        Ok(info) => Ok(web::Json(info)),
        Err(err) if err.code() == ErrorCode::NotFound => Ok(web::Json(UsageInfo::anonymous())),
        Err(err) => Err(err),
    }
}

/// Recent searches for the calling account.
#[utoipa::path(
    get,
    path = "/api/v1/search/history",
    responses(
        (status = 200, description = "Recent searches, most recent first", body = [SearchEvent]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "History requires a paying tier", body = Error),
        (status = 404, description = "Account not found", body = Error)
    ),
    tags = ["search"],
    operation_id = "getHistory"
)]
#[get("/search/history")]
pub async fn history(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<SearchEvent>>> {
    let user_id = session.require_user_id()?;
    let events = state.usage.history_for_owner(&user_id).await?;
    Ok(web::Json(events))
}

/// Zero the calling account's search counter.
#[utoipa::path(
    post,
    path = "/api/v1/search/reset",
    responses(
        (status = 200, description = "Refreshed quota position", body = UsageInfo),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account not found", body = Error)
    ),
    tags = ["search"],
    operation_id = "resetUsage"
)]
#[post("/search/reset")]
pub async fn reset(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UsageInfo>> {
    let user_id = session.require_user_id()?;
    let info = state.usage_command.reset_usage(&user_id).await?;
    Ok(web::Json(info))
}
