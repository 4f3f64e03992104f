//! Route definitions for the `/attendance` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// Routes mounted at `/attendance`.
///
/// ```text
/// POST     /                        -> record_attendance
/// GET      /member/{member_id}      -> list_by_member
/// GET      /date/{service_date}     -> list_by_date
/// GET      /range                   -> list_by_range (?start_date=&end_date=)
/// DELETE   /{id}                    -> delete_attendance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(attendance::record_attendance))
        .route("/member/{member_id}", get(attendance::list_by_member))
        .route("/date/{service_date}", get(attendance::list_by_date))
        .route("/range", get(attendance::list_by_range))
        .route("/{id}", delete(attendance::delete_attendance))
}
