//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use church_core::error::CoreError;
use church_core::roles::RoleType;
use church_db::models::user::UserInfo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{MessageResponse, TokenValidation};
use crate::services::AuthTokens;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Defaults to `MEMBER`.
    #[serde(default)]
    pub role: RoleType,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthTokens>> {
    let user = state.auth.authenticate(&input.username, &input.password).await?;
    let tokens = state.auth.generate_token(&user).await?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(tokens))
}

/// POST /api/auth/register
///
/// Open for `MEMBER` and `VISITOR`. Elevated roles need an admin token.
pub async fn register(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    if input.role.requires_admin_to_grant()
        && caller.as_ref().map(|u| u.role) != Some(RoleType::Admin)
    {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Only an administrator may register a {} account",
            input.role
        ))));
    }

    let user = state
        .auth
        .register_user(&input.username, &input.email, &input.password, input.role)
        .await?;
    Ok((StatusCode::CREATED, Json(UserInfo::from(&user))))
}

/// POST /api/auth/validate
///
/// Always 200; `valid` says whether the token resolved to a user.
pub async fn validate(
    State(state): State<AppState>,
    Json(input): Json<TokenRequest>,
) -> AppResult<Json<TokenValidation>> {
    match state.auth.get_user_from_token(&input.token).await {
        Ok(user) => Ok(Json(TokenValidation {
            valid: user.enabled,
            user: Some(UserInfo::from(&user)),
        })),
        Err(CoreError::Unauthorized(_) | CoreError::NotFound { .. }) => {
            Ok(Json(TokenValidation { valid: false, user: None }))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthTokens>> {
    Ok(Json(state.auth.refresh(&input.refresh_token).await?))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    state.auth.logout(user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<UserInfo>> {
    let user = state.auth.find_user(user.user_id).await?;
    Ok(Json(UserInfo::from(&user)))
}

/// POST /api/auth/password-reset
///
/// Same answer whether or not the address belongs to an account.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.request_password_reset(&input.email).await?;
    Ok(Json(MessageResponse::new(
        "If the address is registered, a reset link has been sent",
    )))
}

/// POST /api/auth/password-reset/confirm
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetConfirm>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth
        .confirm_password_reset(&input.token, &input.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password has been reset")))
}
