//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`. All public except `logout` and `me`.
///
/// ```text
/// POST /login                    -> login
/// POST /register                 -> register (elevated roles need an admin token)
/// POST /validate                 -> validate
/// POST /refresh                  -> refresh
/// POST /logout                   -> logout
/// GET  /me                       -> me
/// POST /password-reset           -> request_password_reset
/// POST /password-reset/confirm   -> confirm_password_reset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/validate", post(auth::validate))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/password-reset", post(auth::request_password_reset))
        .route("/password-reset/confirm", post(auth::confirm_password_reset))
}
