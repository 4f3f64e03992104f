//! Handler for `/audit-logs`.

use axum::extract::{Query, State};
use axum::Json;
use church_core::audit::is_known_action;
use church_core::error::CoreError;
use church_db::models::audit::{AuditLogPage, AuditQuery};
use church_db::repositories::AuditLogRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/audit-logs?action=&user_id=&entity_type=&entity_id=&success=&from=&to=&limit=&offset=
///
/// An `action` filter must name a recorded action.
pub async fn list_audit_logs(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<AuditLogPage>> {
    if let Some(action) = params.action.as_deref() {
        if !is_known_action(action) {
            return Err(CoreError::Validation(format!("Unknown audit action: {action}")).into());
        }
    }
    let items = AuditLogRepo::query(&state.pool, &params).await?;
    let total = AuditLogRepo::count(&state.pool, &params).await?;
    Ok(Json(AuditLogPage { items, total }))
}
