//! Settlement routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::routes::{db_error_response, error_response, require_headship, require_membership};
use crate::{AppState, middleware::AuthUser};
use hearth_core::ledger::{LedgerError, LedgerService};
use hearth_db::{GroupRepository, SettlementRepository};

/// Creates the settlements router (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/settlements", get(list_settlements))
        .route("/groups/{group_id}/settlements", post(create_settlement))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for recording a settlement.
#[derive(Debug, Deserialize)]
pub struct CreateSettlementRequest {
    /// The member being paid out.
    pub user_id: Uuid,
    /// Amount paid (positive).
    pub amount: Decimal,
    /// Settlement date (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Optional note.
    pub note: Option<String>,
}

/// A settlement in API responses.
#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    /// Settlement ID.
    pub id: Uuid,
    /// Owning group.
    pub group_id: Uuid,
    /// The member paid out.
    pub user_id: Uuid,
    /// Amount paid.
    pub amount: Decimal,
    /// Settlement date.
    pub date: NaiveDate,
    /// Note, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

fn settlement_response(settlement: hearth_db::entities::settlements::Model) -> SettlementResponse {
    SettlementResponse {
        id: settlement.id,
        group_id: settlement.group_id,
        user_id: settlement.user_id,
        amount: settlement.amount,
        date: settlement.date,
        note: settlement.note,
        created_at: settlement.created_at.into(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /groups/{group_id}/settlements - List a group's settlements.
async fn list_settlements(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    if let Err(response) = require_membership(&group_repo, group_id, auth.user_id()).await {
        return response;
    }

    let settlement_repo = SettlementRepository::new((*state.db).clone());
    match settlement_repo.list_for_group(group_id).await {
        Ok(settlements) => {
            let response: Vec<SettlementResponse> =
                settlements.into_iter().map(settlement_response).collect();
            Json(response).into_response()
        }
        Err(e) => db_error_response(&e, "settlement listing"),
    }
}

/// POST /groups/{group_id}/settlements - Record a payout (head only).
///
/// Settlements are immutable once recorded; there is no update or delete.
async fn create_settlement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<CreateSettlementRequest>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    if let Err(response) = require_headship(&group_repo, group_id, auth.user_id()).await {
        return response;
    }

    if let Err(e) = LedgerService::validate_amount(payload.amount) {
        return error_response(&e.into());
    }

    // The payout target must be a member of the group.
    match group_repo.member_role(group_id, payload.user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(&LedgerError::BeneficiaryNotMember(payload.user_id).into());
        }
        Err(e) => return db_error_response(&e, "target membership lookup"),
    }

    let settlement_repo = SettlementRepository::new((*state.db).clone());
    match settlement_repo
        .create(
            group_id,
            payload.user_id,
            payload.amount,
            payload.date,
            payload.note.as_deref(),
        )
        .await
    {
        Ok(settlement) => {
            info!(
                settlement_id = %settlement.id,
                group_id = %group_id,
                user_id = %settlement.user_id,
                "Settlement recorded"
            );
            (StatusCode::CREATED, Json(settlement_response(settlement))).into_response()
        }
        Err(e) => db_error_response(&e, "settlement creation"),
    }
}
