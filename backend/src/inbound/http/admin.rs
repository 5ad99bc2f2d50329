//! Admin API handlers.
//!
//! ```text
//! GET  /api/v1/admin/accounts?sortBy=searchCount&order=desc
//! PUT  /api/v1/admin/accounts/{id}/tier {"tier":"unlimited"}
//! POST /api/v1/admin/accounts/{id}/reset
//! GET  /api/v1/admin/accounts/{id}/history
//! ```
//!
//! The capability check lives in the domain service; these handlers only
//! resolve the session, parse parameters, and relay the refusal.

use actix_web::{get, post, put, web};
use serde::Deserialize;
use serde_json::json;

use crate::domain::ports::{AccountSort, AccountSortField, SortOrder};
use crate::domain::{Account, Error, SearchEvent, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::account::{TierChangeRequest, parse_tier};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query parameters accepted by the account listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsParams {
    /// Field to order by: `name`, `email`, `tier`, or `searchCount`.
    pub sort_by: Option<String>,
    /// Direction: `asc` or `desc`.
    pub order: Option<String>,
}

impl ListAccountsParams {
    /// Resolve the requested ordering. Unrecognised input falls back to the
    /// default (name ascending) instead of failing the request, matching the
    /// admin table's behaviour of always rendering something.
    pub(crate) fn sort(&self) -> AccountSort {
        let field = self
            .sort_by
            .as_deref()
            .and_then(AccountSortField::parse)
            .unwrap_or_default();
        let order = match self.order.as_deref() {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        AccountSort { field, order }
    }
}

fn parse_target(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| {
        Error::invalid_request("account id must be a valid UUID")
            .with_details(json!({ "field": "id", "code": "invalid_account_id" }))
    })
}

/// List every account for the admin table.
#[utoipa::path(
    get,
    path = "/api/v1/admin/accounts",
    params(ListAccountsParams),
    responses(
        (status = 200, description = "All accounts in the requested order", body = [Account]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listAccounts"
)]
#[get("/admin/accounts")]
pub async fn list_accounts(
    session: SessionContext,
    state: web::Data<HttpState>,
    params: web::Query<ListAccountsParams>,
) -> ApiResult<web::Json<Vec<Account>>> {
    let caller = session.require_user_id()?;
    let accounts = state.admin.list_accounts(&caller, params.sort()).await?;
    Ok(web::Json(accounts))
}

/// Override a target account's tier.
#[utoipa::path(
    put,
    path = "/api/v1/admin/accounts/{id}/tier",
    params(("id" = String, Path, description = "Target account identifier")),
    request_body = TierChangeRequest,
    responses(
        (status = 200, description = "Updated account", body = Account),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Target account not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminSetTier"
)]
#[put("/admin/accounts/{id}/tier")]
pub async fn set_tier(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<TierChangeRequest>,
) -> ApiResult<web::Json<Account>> {
    let caller = session.require_user_id()?;
    let target = parse_target(&path)?;
    let tier = parse_tier(&payload.tier)?;
    let account = state.admin.set_tier(&caller, &target, tier).await?;
    Ok(web::Json(account))
}

/// Zero a target account's search counter.
#[utoipa::path(
    post,
    path = "/api/v1/admin/accounts/{id}/reset",
    params(("id" = String, Path, description = "Target account identifier")),
    responses(
        (status = 200, description = "Updated account", body = Account),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Target account not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminResetCount"
)]
#[post("/admin/accounts/{id}/reset")]
pub async fn reset_count(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Account>> {
    let caller = session.require_user_id()?;
    let target = parse_target(&path)?;
    let account = state.admin.reset_count(&caller, &target).await?;
    Ok(web::Json(account))
}

/// Full search history of a target account, most recent first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/accounts/{id}/history",
    params(("id" = String, Path, description = "Target account identifier")),
    responses(
        (status = 200, description = "Search history", body = [SearchEvent]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Target account not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminAccountHistory"
)]
#[get("/admin/accounts/{id}/history")]
pub async fn account_history(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<SearchEvent>>> {
    let caller = session.require_user_id()?;
    let target = parse_target(&path)?;
    let events = state.admin.account_history(&caller, &target).await?;
    Ok(web::Json(events))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::Tier;
    use crate::domain::ports::MockAdminOperations;
    use crate::inbound::http::account::login;
    use crate::inbound::http::test_utils::{login_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, web};
    use rstest::rstest;
    use std::sync::Arc;

    fn app_with(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .service(login)
                .service(list_accounts)
                .service(set_tier)
                .service(reset_count)
                .service(account_history),
        )
    }

    #[rstest]
    #[case(Some("searchCount"), Some("desc"), AccountSortField::SearchCount, SortOrder::Desc)]
    #[case(Some("email"), None, AccountSortField::Email, SortOrder::Asc)]
    #[case(Some("createdAt"), Some("sideways"), AccountSortField::Name, SortOrder::Asc)]
    #[case(None, None, AccountSortField::Name, SortOrder::Asc)]
    fn sort_parameters_fall_back_to_name_ascending(
        #[case] sort_by: Option<&str>,
        #[case] order: Option<&str>,
        #[case] field: AccountSortField,
        #[case] direction: SortOrder,
    ) {
        let params = ListAccountsParams {
            sort_by: sort_by.map(str::to_owned),
            order: order.map(str::to_owned),
        };
        let sort = params.sort();
        assert_eq!(sort.field, field);
        assert_eq!(sort.order, direction);
    }

    #[actix_web::test]
    async fn listing_requires_a_session() {
        let app = actix_web::test::init_service(app_with(HttpState::fixture())).await;

        let res = actix_web::test::call_service(
            &app,
            actix_web::test::TestRequest::get()
                .uri("/api/v1/admin/accounts")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn non_admin_sessions_are_refused() {
        let app = actix_web::test::init_service(app_with(HttpState::fixture())).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = actix_web::test::call_service(
            &app,
            actix_web::test::TestRequest::get()
                .uri("/api/v1/admin/accounts")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn sort_parameters_reach_the_port() {
        let mut admin = MockAdminOperations::new();
        admin
            .expect_list_accounts()
            .withf(|_, sort| {
                sort.field == AccountSortField::SearchCount && sort.order == SortOrder::Desc
            })
            .returning(|_, _| Ok(Vec::new()));
        let state = HttpState {
            admin: Arc::new(admin),
            ..HttpState::fixture()
        };

        let app = actix_web::test::init_service(app_with(state)).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = actix_web::test::call_service(
            &app,
            actix_web::test::TestRequest::get()
                .uri("/api/v1/admin/accounts?sortBy=searchCount&order=desc")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn malformed_target_ids_are_rejected_before_the_port() {
        let mut admin = MockAdminOperations::new();
        admin.expect_reset_count().times(0);
        let state = HttpState {
            admin: Arc::new(admin),
            ..HttpState::fixture()
        };

        let app = actix_web::test::init_service(app_with(state)).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = actix_web::test::call_service(
            &app,
            actix_web::test::TestRequest::post()
                .uri("/api/v1/admin/accounts/not-a-uuid/reset")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn tier_override_round_trips() {
        let target = UserId::random();
        let updated = Account::builder(target.clone())
            .name("Hafiz")
            .email("hafiz@example.com")
            .tier(Tier::Unlimited)
            .build();
        let response = updated.clone();

        let mut admin = MockAdminOperations::new();
        admin
            .expect_set_tier()
            .withf(|_, _, tier| *tier == Tier::Unlimited)
            .returning(move |_, _, _| Ok(response.clone()));
        let state = HttpState {
            admin: Arc::new(admin),
            ..HttpState::fixture()
        };

        let app = actix_web::test::init_service(app_with(state)).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = actix_web::test::call_service(
            &app,
            actix_web::test::TestRequest::put()
                .uri(&format!("/api/v1/admin/accounts/{target}/tier"))
                .cookie(cookie)
                .set_json(TierChangeRequest {
                    tier: "unlimited".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: serde_json::Value = actix_web::test::read_body_json(res).await;
        assert_eq!(value.get("tier"), Some(&serde_json::json!("unlimited")));
    }
}
