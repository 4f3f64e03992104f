//! Route definitions for the `/members` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::member;
use crate::state::AppState;

/// Routes mounted at `/members`.
///
/// ```text
/// GET, POST          /                    -> list_members, create_member
/// GET, PUT, DELETE   /{id}                -> get_member, update_member, deactivate_member
/// GET                /email/{email}       -> get_member_by_email
/// GET                /search              -> search_members (?term=)
/// GET                /family/{family_id}  -> list_family_members
/// GET                /membership-range    -> list_by_membership_range
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(member::list_members).post(member::create_member))
        .route(
            "/{id}",
            get(member::get_member)
                .put(member::update_member)
                .delete(member::deactivate_member),
        )
        .route("/email/{email}", get(member::get_member_by_email))
        .route("/search", get(member::search_members))
        .route("/family/{family_id}", get(member::list_family_members))
        .route("/membership-range", get(member::list_by_membership_range))
}
