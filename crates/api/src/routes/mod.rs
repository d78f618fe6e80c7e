//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::auth::auth_middleware};
use hearth_core::group::{Role, require_head, require_member};
use hearth_db::GroupRepository;
use hearth_shared::AppError;

pub mod auth;
pub mod chores;
pub mod groups;
pub mod health;
pub mod ledger;
pub mod settlements;

/// Creates the API router with all routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(groups::routes())
        .merge(chores::routes())
        .merge(ledger::routes())
        .merge(settlements::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Serializes an application error as `{ "error": CODE, "message": text }`
/// with the status its kind maps to.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// Logs a database error and returns an opaque 500 response.
pub(crate) fn db_error_response(err: &DbErr, context: &'static str) -> Response {
    error!(error = %err, context, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

/// Resolves the caller's role and requires membership.
///
/// Membership is checked before anything else in every group-scoped handler,
/// so a non-member probing a group cannot learn whether anything inside it
/// exists.
pub(crate) async fn require_membership(
    groups: &GroupRepository,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<Role, Response> {
    let role = groups
        .member_role(group_id, user_id)
        .await
        .map_err(|e| db_error_response(&e, "membership lookup"))?;

    require_member(role).map_err(|e| error_response(&e.into()))
}

/// Resolves the caller's role and requires the head role.
pub(crate) async fn require_headship(
    groups: &GroupRepository,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<(), Response> {
    let role = groups
        .member_role(group_id, user_id)
        .await
        .map_err(|e| db_error_response(&e, "membership lookup"))?;

    require_head(role).map_err(|e| error_response(&e.into()))
}
