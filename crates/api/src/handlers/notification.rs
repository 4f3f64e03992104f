//! Handler for `/notifications/bulk-email`.

use axum::extract::State;
use axum::Json;
use church_events::{EmailRequest, EmailResult};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// POST /api/notifications/bulk-email
///
/// Sends every message concurrently. Any failure fails the request and
/// lists each failed message.
pub async fn send_bulk_email(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(requests): Json<Vec<EmailRequest>>,
) -> AppResult<Json<Vec<EmailResult>>> {
    tracing::info!(user_id = user.user_id, count = requests.len(), "Bulk email requested");
    let results = state.email.send_bulk_emails(&requests).await?;
    Ok(Json(results))
}
