//! Route definitions for the `/groups` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::group;
use crate::state::AppState;

/// Routes mounted at `/groups`.
///
/// ```text
/// GET, POST          /                          -> list_groups (?active=), create_group
/// GET, PUT, DELETE   /{id}                      -> get_group, update_group, delete_group
/// GET                /{id}/members              -> list_members
/// POST, DELETE       /{id}/members/{member_id}  -> add_member, remove_member
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(group::list_groups).post(group::create_group))
        .route(
            "/{id}",
            get(group::get_group)
                .put(group::update_group)
                .delete(group::delete_group),
        )
        .route("/{id}/members", get(group::list_members))
        .route(
            "/{id}/members/{member_id}",
            post(group::add_member).delete(group::remove_member),
        )
}
