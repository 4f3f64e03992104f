//! Route definitions for `/reports`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET    /members/{id}/donation-summary  -> member_donation_summary
/// GET    /top-donors                     -> top_donors (?limit=)
/// GET    /member-search                  -> member_search (?term=)
/// POST   /procedures/{name}              -> call_procedure (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/members/{id}/donation-summary",
            get(report::member_donation_summary),
        )
        .route("/top-donors", get(report::top_donors))
        .route("/member-search", get(report::member_search))
        .route("/procedures/{name}", post(report::call_procedure))
}
