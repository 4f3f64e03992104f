pub mod attendance;
pub mod auth;
pub mod donation;
pub mod event;
pub mod family;
pub mod group;
pub mod health;
pub mod member;
pub mod report;
pub mod volunteer;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/...                     public, except logout and me
/// /members/...                  read: ADMIN|PASTOR|VOLUNTEER, write: ADMIN|PASTOR
/// /families/...                 same as members
/// /groups/...                   authenticated
/// /events/...                   authenticated
/// /donations/...                authenticated
/// /attendance/...               authenticated
/// /volunteers/...               authenticated
/// /reports/...                  authenticated; /procedures/{name} admin only
/// /notifications/bulk-email     admin only
/// /audit-logs                   admin only
/// ```
///
/// Every DELETE is admin only.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/members", member::router())
        .nest("/families", family::router())
        .nest("/groups", group::router())
        .nest("/events", event::router())
        .nest("/donations", donation::router())
        .nest("/attendance", attendance::router())
        .nest("/volunteers", volunteer::router())
        .nest("/reports", report::router())
        .route(
            "/notifications/bulk-email",
            post(handlers::notification::send_bulk_email),
        )
        .route("/audit-logs", get(handlers::audit::list_audit_logs))
}
