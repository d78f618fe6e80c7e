//! Authentication routes for register, login, and token refresh.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::routes::db_error_response;
use crate::{AppState, middleware::AuthUser};
use hearth_core::auth::{hash_password, verify_password};
use hearth_db::UserRepository;
use hearth_shared::auth::{
    LoginRequest, LoginResponse, RefreshRequest, RegisterRequest, TokenPair, UserInfo,
};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Creates the auth routes that require authentication.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

fn user_info(user: hearth_db::entities::users::Model) -> UserInfo {
    UserInfo {
        id: user.id,
        email: user.email,
        name: user.name,
        dob: user.dob,
        sex: user.sex,
        created_at: user.created_at.into(),
    }
}

/// POST /auth/register - Create a new user account.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    if !payload.email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_email",
                "message": "A valid email address is required"
            })),
        )
            .into_response();
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "weak_password",
                "message": format!("Password must be at least {MIN_PASSWORD_LEN} characters")
            })),
        )
            .into_response();
    }
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "name_required",
                "message": "A display name is required"
            })),
        )
            .into_response();
    }

    let user_repo = UserRepository::new((*state.db).clone());

    // Check email availability
    match user_repo.find_by_email(&payload.email).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_exists",
                    "message": "An account with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => return db_error_response(&e, "email availability check"),
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred during registration"
                })),
            )
                .into_response();
        }
    };

    let user = match user_repo
        .create(
            &payload.email,
            &password_hash,
            payload.name.trim(),
            payload.dob,
            payload.sex.as_deref(),
        )
        .await
    {
        Ok(u) => u,
        Err(e) => return db_error_response(&e, "user creation"),
    };

    info!(user_id = %user.id, "User registered");

    (StatusCode::CREATED, Json(user_info(user))).into_response()
}

/// POST /auth/login - Authenticate a user and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return invalid_credentials();
        }
        Err(e) => return db_error_response(&e, "login lookup"),
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred during login"
                })),
            )
                .into_response();
        }
    }

    let tokens = match issue_tokens(&state, user.id) {
        Ok(t) => t,
        Err(response) => return response,
    };

    info!(user_id = %user.id, "User logged in");

    Json(LoginResponse {
        tokens,
        user: user_info(user),
    })
    .into_response()
}

/// POST /auth/refresh - Exchange a refresh token for a new token pair.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(e) => {
            info!(error = %e, "Refresh with invalid token");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_token",
                    "message": "Invalid or expired refresh token"
                })),
            )
                .into_response();
        }
    };

    // The user must still exist
    let user_repo = UserRepository::new((*state.db).clone());
    match user_repo.find_by_id(claims.user_id()).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_token",
                    "message": "Invalid or expired refresh token"
                })),
            )
                .into_response();
        }
        Err(e) => return db_error_response(&e, "refresh lookup"),
    }

    match issue_tokens(&state, claims.user_id()) {
        Ok(tokens) => Json(tokens).into_response(),
        Err(response) => response,
    }
}

/// GET /auth/me - Return the authenticated user.
async fn me(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(user)) => Json(user_info(user)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "NOT_FOUND",
                "message": "User no longer exists"
            })),
        )
            .into_response(),
        Err(e) => db_error_response(&e, "me lookup"),
    }
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

fn issue_tokens(state: &AppState, user_id: uuid::Uuid) -> Result<TokenPair, axum::response::Response> {
    let access_token = state.jwt_service.generate_access_token(user_id).map_err(|e| {
        error!(error = %e, "Failed to generate access token");
        token_failure()
    })?;
    let refresh_token = state
        .jwt_service
        .generate_refresh_token(user_id)
        .map_err(|e| {
            error!(error = %e, "Failed to generate refresh token");
            token_failure()
        })?;

    Ok(TokenPair::new(
        access_token,
        refresh_token,
        state.jwt_service.access_token_expires_in(),
    ))
}

fn token_failure() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred issuing tokens"
        })),
    )
        .into_response()
}
