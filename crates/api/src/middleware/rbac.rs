//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement with 403 Forbidden.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use church_core::error::CoreError;
use church_core::roles::RoleType;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

fn forbidden(message: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(message.into()))
}

/// Requires the `ADMIN` role. Every delete goes through this.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user =
            <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        if user.role != RoleType::Admin {
            return Err(forbidden("Admin role required"));
        }
        Ok(RequireAdmin(user))
    }
}

/// Create and update of member and family records: `ADMIN` or `PASTOR`.
pub struct RequireRecordManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireRecordManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user =
            <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        if !user.role.can_manage_records() {
            return Err(forbidden("Admin or Pastor role required"));
        }
        Ok(RequireRecordManager(user))
    }
}

/// Reads of member and family records: `ADMIN`, `PASTOR` or `VOLUNTEER`.
pub struct RequireRecordReader(pub AuthUser);

impl FromRequestParts<AppState> for RequireRecordReader {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user =
            <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        if !user.role.can_read_records() {
            return Err(forbidden("Admin, Pastor or Volunteer role required"));
        }
        Ok(RequireRecordReader(user))
    }
}

/// Requires any authenticated user.
///
/// Same as [`AuthUser`], named for routes where "must be logged in" should
/// read explicitly.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user =
            <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
