#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use church_api::auth::jwt::JwtConfig;
use church_api::auth::password::hash_password;
use church_api::config::ServerConfig;
use church_api::router::build_app_router;
use church_api::state::AppState;
use church_core::roles::RoleType;
use church_db::models::user::{CreateUser, User};
use church_db::repositories::UserRepo;
use church_events::email::MemoryTransport;
use church_events::{EmailService, EventBus};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test_password_123";

/// A `ServerConfig` that never touches the environment.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: String::new(),
        db_max_connections: 5,
        public_base_url: "http://localhost:3000".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-do-not-use-in-production".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
        },
    }
}

/// The production router over `pool`, with email captured in memory.
///
/// No queue consumers run here; events published by the services are
/// simply dropped by the bus.
pub fn build_test_app_with_mail(pool: PgPool) -> (Router, MemoryTransport) {
    let config = test_config();
    let transport = MemoryTransport::default();
    let email = EmailService::new(Arc::new(transport.clone()), config.public_base_url.clone());
    let state = AppState::new(pool, config.clone(), Arc::new(EventBus::default()), email);
    (build_app_router(state, &config), transport)
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_mail(pool).0
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, request("GET", uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request("GET", uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, request("POST", uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request("POST", uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request("POST", uri, Some(token), None)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request("PUT", uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request("DELETE", uri, Some(token), None)).await
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] straight into the database.
pub async fn create_user(pool: &PgPool, username: &str, role: RoleType) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        role,
    };
    UserRepo::create(pool, &input).await.unwrap()
}

/// Log in through the API and return the full token response.
pub async fn login(app: Router, username: &str, password: &str) -> Value {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Create a user with `role` and return an access token for it.
pub async fn token_for(pool: &PgPool, app: &Router, username: &str, role: RoleType) -> String {
    create_user(pool, username, role).await;
    let json = login(app.clone(), username, TEST_PASSWORD).await;
    json["access_token"].as_str().unwrap().to_string()
}
