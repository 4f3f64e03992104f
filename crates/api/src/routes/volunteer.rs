//! Route definitions for the `/volunteers` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::volunteer;
use crate::state::AppState;

/// Routes mounted at `/volunteers`.
///
/// ```text
/// GET, POST          /                     -> list_volunteers, create_volunteer
/// GET, PUT, DELETE   /{id}                 -> get_volunteer, update_volunteer, delete_volunteer
/// GET                /member/{member_id}   -> list_by_member
/// GET                /role/{role}          -> list_by_role
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(volunteer::list_volunteers).post(volunteer::create_volunteer),
        )
        .route(
            "/{id}",
            get(volunteer::get_volunteer)
                .put(volunteer::update_volunteer)
                .delete(volunteer::delete_volunteer),
        )
        .route("/member/{member_id}", get(volunteer::list_by_member))
        .route("/role/{role}", get(volunteer::list_by_role))
}
