//! Group and membership routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::routes::{db_error_response, require_headship, require_membership};
use crate::{AppState, middleware::AuthUser};
use hearth_core::group::Role;
use hearth_db::repositories::invite::DEFAULT_EXPIRY_DAYS;
use hearth_db::{GroupRepository, InviteRepository};

/// Creates the groups router (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", post(create_group))
        .route("/groups", get(list_groups))
        .route("/groups/join", post(join_group))
        .route("/groups/{group_id}", get(get_group))
        .route("/groups/{group_id}/members", get(list_members))
        .route("/groups/{group_id}/invite", post(create_invite))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a group.
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    /// Group name.
    pub name: String,
}

/// Request body for creating an invite.
#[derive(Debug, Deserialize, Default)]
pub struct InviteRequest {
    /// Invite validity in days (defaults to 7).
    pub expires_in_days: Option<i64>,
}

/// Request body for joining a group.
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    /// The invite token.
    pub token: String,
}

/// A group in API responses.
#[derive(Debug, Serialize)]
pub struct GroupResponse {
    /// Group ID.
    pub id: Uuid,
    /// Group name.
    pub name: String,
    /// The head's user ID.
    pub head_user_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A group member in API responses.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    /// The member's user ID.
    pub user_id: Uuid,
    /// The member's display name.
    pub name: String,
    /// The member's email.
    pub email: String,
    /// The member's role.
    pub role: Role,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
}

/// Group details with members and chore count.
#[derive(Debug, Serialize)]
pub struct GroupDetailResponse {
    /// The group.
    #[serde(flatten)]
    pub group: GroupResponse,
    /// Current members.
    pub members: Vec<MemberResponse>,
    /// Number of chores defined in the group.
    pub chores_count: u64,
}

/// An issued invite.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    /// The token to share.
    pub token: String,
    /// When the token stops working.
    pub expires_at: DateTime<Utc>,
}

fn group_response(group: hearth_db::entities::groups::Model) -> GroupResponse {
    GroupResponse {
        id: group.id,
        name: group.name,
        head_user_id: group.head_user_id,
        created_at: group.created_at.into(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /groups - Create a group with the caller as head.
async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateGroupRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "name_required",
                "message": "A group name is required"
            })),
        )
            .into_response();
    }

    let group_repo = GroupRepository::new((*state.db).clone());

    match group_repo
        .create_with_head(payload.name.trim(), auth.user_id())
        .await
    {
        Ok(group) => {
            info!(group_id = %group.id, head_id = %auth.user_id(), "Group created");
            (StatusCode::CREATED, Json(group_response(group))).into_response()
        }
        Err(e) => db_error_response(&e, "group creation"),
    }
}

/// GET /groups - List the caller's groups.
async fn list_groups(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    match group_repo.list_for_user(auth.user_id()).await {
        Ok(groups) => {
            let response: Vec<GroupResponse> = groups.into_iter().map(group_response).collect();
            Json(response).into_response()
        }
        Err(e) => db_error_response(&e, "group listing"),
    }
}

/// GET /groups/{group_id} - Group details with members and chore count.
async fn get_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    if let Err(response) = require_membership(&group_repo, group_id, auth.user_id()).await {
        return response;
    }

    let group = match group_repo.find_by_id(group_id).await {
        Ok(Some(g)) => g,
        Ok(None) => {
            // Membership passed, so the group vanished mid-request.
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "NOT_FOUND",
                    "message": "Group not found"
                })),
            )
                .into_response();
        }
        Err(e) => return db_error_response(&e, "group lookup"),
    };

    let members = match group_repo.list_members(group_id).await {
        Ok(m) => m,
        Err(e) => return db_error_response(&e, "member listing"),
    };

    let chores_count = match group_repo.count_chores(group_id).await {
        Ok(c) => c,
        Err(e) => return db_error_response(&e, "chore count"),
    };

    Json(GroupDetailResponse {
        group: group_response(group),
        members: members
            .into_iter()
            .map(|m| MemberResponse {
                user_id: m.membership.user_id,
                name: m.name,
                email: m.email,
                role: m.membership.role.into(),
                joined_at: m.membership.joined_at.into(),
            })
            .collect(),
        chores_count,
    })
    .into_response()
}

/// GET /groups/{group_id}/members - List members of a group.
async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    if let Err(response) = require_membership(&group_repo, group_id, auth.user_id()).await {
        return response;
    }

    match group_repo.list_members(group_id).await {
        Ok(members) => {
            let response: Vec<MemberResponse> = members
                .into_iter()
                .map(|m| MemberResponse {
                    user_id: m.membership.user_id,
                    name: m.name,
                    email: m.email,
                    role: m.membership.role.into(),
                    joined_at: m.membership.joined_at.into(),
                })
                .collect();
            Json(response).into_response()
        }
        Err(e) => db_error_response(&e, "member listing"),
    }
}

/// POST /groups/{group_id}/invite - Issue an invite token (head only).
async fn create_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
    payload: Option<Json<InviteRequest>>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    if let Err(response) = require_headship(&group_repo, group_id, auth.user_id()).await {
        return response;
    }

    let expires_in_days = payload
        .and_then(|Json(p)| p.expires_in_days)
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_EXPIRY_DAYS);

    let invite_repo = InviteRepository::new((*state.db).clone());
    match invite_repo.create(group_id, expires_in_days).await {
        Ok(invite) => {
            info!(group_id = %group_id, invite_id = %invite.id, "Invite created");
            (
                StatusCode::CREATED,
                Json(InviteResponse {
                    token: invite.token,
                    expires_at: invite.expires_at.into(),
                }),
            )
                .into_response()
        }
        Err(e) => db_error_response(&e, "invite creation"),
    }
}

/// POST /groups/join - Join a group with an invite token.
async fn join_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<JoinRequest>,
) -> impl IntoResponse {
    let invite_repo = InviteRepository::new((*state.db).clone());
    let group_repo = GroupRepository::new((*state.db).clone());

    let invite = match invite_repo.find_by_token(&payload.token).await {
        Ok(Some(i)) => i,
        Ok(None) => return invalid_invite(),
        Err(e) => return db_error_response(&e, "invite lookup"),
    };

    if DateTime::<Utc>::from(invite.expires_at) < Utc::now() {
        return invalid_invite();
    }

    // Reject duplicate joins before inserting
    match group_repo.member_role(invite.group_id, auth.user_id()).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "CONFLICT",
                    "message": "Already a member of this group"
                })),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => return db_error_response(&e, "membership lookup"),
    }

    if let Err(e) = group_repo
        .add_member(invite.group_id, auth.user_id(), Role::Member)
        .await
    {
        return db_error_response(&e, "member insert");
    }

    info!(group_id = %invite.group_id, user_id = %auth.user_id(), "User joined group");

    match group_repo.find_by_id(invite.group_id).await {
        Ok(Some(group)) => Json(group_response(group)).into_response(),
        Ok(None) => invalid_invite(),
        Err(e) => db_error_response(&e, "group lookup"),
    }
}

/// Unknown and expired tokens are indistinguishable to the caller.
fn invalid_invite() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "INVALID_ARGUMENT",
            "message": "Invalid or expired invite token"
        })),
    )
        .into_response()
}
