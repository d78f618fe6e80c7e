//! Chore catalog routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::routes::{db_error_response, error_response, require_headship, require_membership};
use crate::{AppState, middleware::AuthUser};
use hearth_core::ledger::LedgerService;
use hearth_db::repositories::UpdateChoreInput;
use hearth_db::{ChoreRepository, GroupRepository};

/// Creates the chores router (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/chores", get(list_chores))
        .route("/groups/{group_id}/chores", post(create_chore))
        .route("/chores/{chore_id}", patch(update_chore))
        .route("/chores/{chore_id}", delete(delete_chore))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a chore.
#[derive(Debug, Deserialize)]
pub struct CreateChoreRequest {
    /// Chore name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Monetary value (positive).
    pub amount: Decimal,
}

/// Request body for updating a chore.
#[derive(Debug, Deserialize)]
pub struct UpdateChoreRequest {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New amount (positive).
    pub amount: Option<Decimal>,
}

/// A chore in API responses.
#[derive(Debug, Serialize)]
pub struct ChoreResponse {
    /// Chore ID.
    pub id: Uuid,
    /// Owning group.
    pub group_id: Uuid,
    /// Chore name.
    pub name: String,
    /// Description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Monetary value.
    pub amount: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

fn chore_response(chore: hearth_db::entities::chores::Model) -> ChoreResponse {
    ChoreResponse {
        id: chore.id,
        group_id: chore.group_id,
        name: chore.name,
        description: chore.description,
        amount: chore.amount,
        created_at: chore.created_at.into(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /groups/{group_id}/chores - List a group's chores.
async fn list_chores(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    if let Err(response) = require_membership(&group_repo, group_id, auth.user_id()).await {
        return response;
    }

    let chore_repo = ChoreRepository::new((*state.db).clone());
    match chore_repo.list_for_group(group_id).await {
        Ok(chores) => {
            let response: Vec<ChoreResponse> = chores.into_iter().map(chore_response).collect();
            Json(response).into_response()
        }
        Err(e) => db_error_response(&e, "chore listing"),
    }
}

/// POST /groups/{group_id}/chores - Create a chore (head only).
async fn create_chore(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<CreateChoreRequest>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    if let Err(response) = require_headship(&group_repo, group_id, auth.user_id()).await {
        return response;
    }

    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "name_required",
                "message": "A chore name is required"
            })),
        )
            .into_response();
    }
    if let Err(e) = LedgerService::validate_amount(payload.amount) {
        return error_response(&e.into());
    }

    let chore_repo = ChoreRepository::new((*state.db).clone());
    match chore_repo
        .create(
            group_id,
            payload.name.trim(),
            payload.description.as_deref(),
            payload.amount,
        )
        .await
    {
        Ok(chore) => {
            info!(group_id = %group_id, chore_id = %chore.id, "Chore created");
            (StatusCode::CREATED, Json(chore_response(chore))).into_response()
        }
        Err(e) => db_error_response(&e, "chore creation"),
    }
}

/// PATCH /chores/{chore_id} - Update a chore (head of its group only).
async fn update_chore(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chore_id): Path<Uuid>,
    Json(payload): Json<UpdateChoreRequest>,
) -> impl IntoResponse {
    let chore_repo = ChoreRepository::new((*state.db).clone());

    let chore = match chore_repo.find_by_id(chore_id).await {
        Ok(Some(c)) => c,
        Ok(None) => return chore_not_found(),
        Err(e) => return db_error_response(&e, "chore lookup"),
    };

    let group_repo = GroupRepository::new((*state.db).clone());
    if let Err(response) = require_headship(&group_repo, chore.group_id, auth.user_id()).await {
        return response;
    }

    if let Some(amount) = payload.amount
        && let Err(e) = LedgerService::validate_amount(amount)
    {
        return error_response(&e.into());
    }

    let input = UpdateChoreInput {
        name: payload.name,
        description: payload.description,
        amount: payload.amount,
    };

    match chore_repo.update(chore_id, input).await {
        Ok(Some(updated)) => Json(chore_response(updated)).into_response(),
        Ok(None) => chore_not_found(),
        Err(e) => db_error_response(&e, "chore update"),
    }
}

/// DELETE /chores/{chore_id} - Delete a chore (head of its group only).
async fn delete_chore(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chore_id): Path<Uuid>,
) -> impl IntoResponse {
    let chore_repo = ChoreRepository::new((*state.db).clone());

    let chore = match chore_repo.find_by_id(chore_id).await {
        Ok(Some(c)) => c,
        Ok(None) => return chore_not_found(),
        Err(e) => return db_error_response(&e, "chore lookup"),
    };

    let group_repo = GroupRepository::new((*state.db).clone());
    if let Err(response) = require_headship(&group_repo, chore.group_id, auth.user_id()).await {
        return response;
    }

    match chore_repo.delete(chore_id).await {
        Ok(true) => {
            info!(chore_id = %chore_id, "Chore deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => chore_not_found(),
        Err(e) => db_error_response(&e, "chore delete"),
    }
}

fn chore_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NOT_FOUND",
            "message": "Chore not found"
        })),
    )
        .into_response()
}
