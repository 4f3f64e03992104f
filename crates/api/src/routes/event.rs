//! Route definitions for the `/events` resource.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::event;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET, POST          /                                           -> list_events (?active=), create_event
/// GET, PUT, DELETE   /{id}                                       -> get_event, update_event, delete_event
/// GET, POST          /{id}/registrations                         -> list_registrations, register_member
/// PUT                /{id}/registrations/{member_id}/attended    -> mark_attended
/// DELETE             /{id}/registrations/{member_id}             -> cancel_registration
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(event::list_events).post(event::create_event))
        .route(
            "/{id}",
            get(event::get_event)
                .put(event::update_event)
                .delete(event::delete_event),
        )
        .route(
            "/{id}/registrations",
            get(event::list_registrations).post(event::register_member),
        )
        .route(
            "/{id}/registrations/{member_id}/attended",
            put(event::mark_attended),
        )
        .route(
            "/{id}/registrations/{member_id}",
            delete(event::cancel_registration),
        )
}
