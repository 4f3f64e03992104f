//! Route definitions for the `/families` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::family;
use crate::state::AppState;

/// Routes mounted at `/families`.
///
/// ```text
/// GET, POST          /               -> list_families, create_family
/// GET                /search         -> search_families (?name=)
/// GET, PUT, DELETE   /{id}           -> get_family, update_family, delete_family
/// GET                /{id}/members   -> list_members
/// GET                /{id}/head      -> get_head
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(family::list_families).post(family::create_family))
        .route("/search", get(family::search_families))
        .route(
            "/{id}",
            get(family::get_family)
                .put(family::update_family)
                .delete(family::delete_family),
        )
        .route("/{id}/members", get(family::list_members))
        .route("/{id}/head", get(family::get_head))
}
