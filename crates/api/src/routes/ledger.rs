//! Ledger entry routes: creation, approval queue, balances.
//!
//! Every handler resolves the caller's membership first, keeps the business
//! decision in `hearth_core`, and leaves the transition race to the
//! repository's conditional update.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::routes::{db_error_response, error_response, require_headship, require_membership};
use crate::{AppState, middleware::AuthUser};
use hearth_core::group::{Role, require_member};
use hearth_core::ledger::{
    ChoreRef, CreateEntryInput, EntryStatus, LedgerError, LedgerService, Resolution,
};
use hearth_db::entities::ledger_entries;
use hearth_db::{ChoreRepository, GroupRepository, LedgerRepository};

/// Creates the ledger router (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/ledger", get(list_ledger))
        .route("/groups/{group_id}/ledger", post(create_entry))
        .route("/groups/{group_id}/pending", get(list_pending))
        .route("/groups/{group_id}/balance", get(get_balance))
        .route("/ledger/{entry_id}/approve", post(approve_entry))
        .route("/ledger/{entry_id}/reject", post(reject_entry))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing ledger entries.
#[derive(Debug, Deserialize)]
pub struct ListLedgerQuery {
    /// Optional status filter (`pending_approval`, `approved`, `rejected`).
    pub status: Option<String>,
}

/// Request body for creating a ledger entry.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Beneficiary user ID. Only honored when the caller is the head.
    pub user_id: Option<Uuid>,
    /// The chore that was completed.
    pub chore_id: Uuid,
    /// Amount to credit (positive; the UI prefills the chore's value).
    pub amount: Decimal,
}

/// A ledger entry in API responses.
#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Owning group.
    pub group_id: Uuid,
    /// Beneficiary user ID.
    pub user_id: Uuid,
    /// The chore recorded.
    pub chore_id: Uuid,
    /// Amount credited when approved.
    pub amount: Decimal,
    /// Entry status.
    pub status: EntryStatus,
    /// Who created the entry.
    pub created_by_user_id: Uuid,
    /// Who approved it, if approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by_user_id: Option<Uuid>,
    /// Who rejected it, if rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by_user_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

fn entry_response(entry: ledger_entries::Model) -> LedgerEntryResponse {
    LedgerEntryResponse {
        id: entry.id,
        group_id: entry.group_id,
        user_id: entry.user_id,
        chore_id: entry.chore_id,
        amount: entry.amount,
        status: entry.status.into(),
        created_by_user_id: entry.created_by_user_id,
        approved_by_user_id: entry.approved_by_user_id,
        rejected_by_user_id: entry.rejected_by_user_id,
        created_at: entry.created_at.into(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /groups/{group_id}/ledger - List a group's entries, newest first.
async fn list_ledger(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Query(query): Query<ListLedgerQuery>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    if let Err(response) = require_membership(&group_repo, group_id, auth.user_id()).await {
        return response;
    }

    let status = match LedgerService::parse_status_filter(query.status.as_deref()) {
        Ok(s) => s,
        Err(e) => return error_response(&e.into()),
    };

    let ledger_repo = LedgerRepository::new((*state.db).clone());
    match ledger_repo.list_for_group(group_id, status).await {
        Ok(entries) => {
            let response: Vec<LedgerEntryResponse> =
                entries.into_iter().map(entry_response).collect();
            Json(response).into_response()
        }
        Err(e) => db_error_response(&e, "ledger listing"),
    }
}

/// POST /groups/{group_id}/ledger - Record a completed chore.
///
/// A head's entry is created already approved (crediting the chosen member
/// or the head itself); a member's entry is created pending and always
/// credits the member.
async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<CreateEntryRequest>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    let role = match require_membership(&group_repo, group_id, auth.user_id()).await {
        Ok(role) => role,
        Err(response) => return response,
    };

    // Resolve the referenced chore up front; the core policy sees it as a
    // plain lookup.
    let chore_repo = ChoreRepository::new((*state.db).clone());
    let chore = match chore_repo.find_by_id(payload.chore_id).await {
        Ok(chore) => chore.map(|c| ChoreRef {
            id: c.id,
            group_id: c.group_id,
            amount: c.amount,
        }),
        Err(e) => return db_error_response(&e, "chore lookup"),
    };

    // Same for the head-chosen beneficiary's membership.
    let beneficiary_is_member = match (role, payload.user_id) {
        (Role::Head, Some(beneficiary)) if beneficiary != auth.user_id() => {
            match group_repo.member_role(group_id, beneficiary).await {
                Ok(found) => found.is_some(),
                Err(e) => return db_error_response(&e, "beneficiary lookup"),
            }
        }
        _ => true,
    };

    let input = CreateEntryInput {
        group_id,
        caller_id: auth.user_id(),
        caller_role: role,
        beneficiary_id: payload.user_id,
        chore_id: payload.chore_id,
        amount: payload.amount,
    };

    let decision = match LedgerService::validate_create(
        &input,
        |id| chore.clone().filter(|c| c.id == id),
        |_| beneficiary_is_member,
    ) {
        Ok(decision) => decision,
        Err(e) => return error_response(&e.into()),
    };

    let ledger_repo = LedgerRepository::new((*state.db).clone());
    match ledger_repo
        .create(group_id, payload.chore_id, payload.amount, auth.user_id(), &decision)
        .await
    {
        Ok(entry) => {
            info!(
                entry_id = %entry.id,
                group_id = %group_id,
                status = %EntryStatus::from(entry.status.clone()),
                "Ledger entry created"
            );
            (StatusCode::CREATED, Json(entry_response(entry))).into_response()
        }
        Err(e) => db_error_response(&e, "ledger entry creation"),
    }
}

/// POST /ledger/{entry_id}/approve - Approve a pending entry (head only).
async fn approve_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse {
    resolve_entry(&state, &auth, entry_id, TransitionKind::Approve).await
}

/// POST /ledger/{entry_id}/reject - Reject a pending entry (head only).
async fn reject_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse {
    resolve_entry(&state, &auth, entry_id, TransitionKind::Reject).await
}

#[derive(Clone, Copy)]
enum TransitionKind {
    Approve,
    Reject,
}

/// Shared approve/reject flow.
///
/// Order matters: entry existence, then membership of the entry's group,
/// then the core transition check, then the conditional update. Losing the
/// update race surfaces as the same conflict as a stale status check.
async fn resolve_entry(
    state: &AppState,
    auth: &AuthUser,
    entry_id: Uuid,
    kind: TransitionKind,
) -> axum::response::Response {
    let ledger_repo = LedgerRepository::new((*state.db).clone());

    let entry = match ledger_repo.find_by_id(entry_id).await {
        Ok(Some(entry)) => entry,
        Ok(None) => return error_response(&LedgerError::EntryNotFound(entry_id).into()),
        Err(e) => return db_error_response(&e, "entry lookup"),
    };

    let group_repo = GroupRepository::new((*state.db).clone());
    let role = match group_repo.member_role(entry.group_id, auth.user_id()).await {
        Ok(role) => role,
        Err(e) => return db_error_response(&e, "membership lookup"),
    };
    let role = match require_member(role) {
        Ok(role) => role,
        Err(e) => return error_response(&e.into()),
    };

    let status = EntryStatus::from(entry.status);
    let resolution = match kind {
        TransitionKind::Approve => LedgerService::approve(role, status, auth.user_id()),
        TransitionKind::Reject => LedgerService::reject(role, status, auth.user_id()),
    };
    let resolution: Resolution = match resolution {
        Ok(resolution) => resolution,
        Err(e) => return error_response(&e.into()),
    };

    match ledger_repo.resolve(entry_id, resolution).await {
        Ok(Some(updated)) => {
            info!(
                entry_id = %entry_id,
                resolved_by = %auth.user_id(),
                status = %EntryStatus::from(updated.status.clone()),
                "Ledger entry resolved"
            );
            Json(entry_response(updated)).into_response()
        }
        // The conditional update matched no pending row: a concurrent call
        // resolved the entry between our read and this write.
        Ok(None) => error_response(&LedgerError::EntryNotPending.into()),
        Err(e) => db_error_response(&e, "entry resolution"),
    }
}

/// GET /groups/{group_id}/pending - The head's approval queue.
async fn list_pending(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    // Head-only, unlike the general listing.
    if let Err(response) = require_headship(&group_repo, group_id, auth.user_id()).await {
        return response;
    }

    let ledger_repo = LedgerRepository::new((*state.db).clone());
    match ledger_repo
        .list_for_group(group_id, Some(EntryStatus::PendingApproval))
        .await
    {
        Ok(entries) => {
            let response: Vec<LedgerEntryResponse> =
                entries.into_iter().map(entry_response).collect();
            Json(response).into_response()
        }
        Err(e) => db_error_response(&e, "pending listing"),
    }
}

/// GET /groups/{group_id}/balance - Per-member balances.
async fn get_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    if let Err(response) = require_membership(&group_repo, group_id, auth.user_id()).await {
        return response;
    }

    let ledger_repo = LedgerRepository::new((*state.db).clone());
    match ledger_repo.balances_for_group(group_id).await {
        Ok(balances) => Json(balances).into_response(),
        Err(e) => db_error_response(&e, "balance computation"),
    }
}
