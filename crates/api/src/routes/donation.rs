//! Route definitions for the `/donations` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::donation;
use crate::state::AppState;

/// Routes mounted at `/donations`.
///
/// ```text
/// GET, POST     /                          -> list_donations, create_donation
/// GET           /statistics                -> statistics (?start_date=&end_date=)
/// GET, DELETE   /{id}                      -> get_donation, delete_donation
/// GET           /member/{member_id}        -> list_member_donations
/// GET           /member/{member_id}/total  -> member_total
/// GET           /type/{type}               -> list_by_type (?start_date=&end_date=)
/// GET           /type/{type}/total         -> type_total (?start_date=&end_date=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(donation::list_donations).post(donation::create_donation),
        )
        .route("/statistics", get(donation::statistics))
        .route(
            "/{id}",
            get(donation::get_donation).delete(donation::delete_donation),
        )
        .route("/member/{member_id}", get(donation::list_member_donations))
        .route("/member/{member_id}/total", get(donation::member_total))
        .route("/type/{kind}", get(donation::list_by_type))
        .route("/type/{kind}/total", get(donation::type_total))
}
