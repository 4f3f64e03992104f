//! Handlers for `/reports`: typed wrappers over the registered report
//! functions plus the generic admin dispatcher.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use church_core::error::CoreError;
use church_core::types::DbId;
use church_db::procedures::ProcedureCall;
use serde_json::{json, Map, Value};

use super::ensure_member;
use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::{LimitParams, TermParams};
use crate::state::AppState;

const DEFAULT_TOP_DONORS: i64 = 10;
const MAX_TOP_DONORS: i64 = 100;

type Rows = Vec<Map<String, Value>>;

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// GET /api/reports/members/{id}/donation-summary
pub async fn member_donation_summary(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Rows>> {
    ensure_member(&state, id).await?;
    let rows = state
        .procedures
        .execute("get_member_donation_summary", &params(json!({ "member_id": id })))
        .await?;
    Ok(Json(rows))
}

/// GET /api/reports/top-donors?limit=
pub async fn top_donors(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<LimitParams>,
) -> AppResult<Json<Rows>> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_DONORS).clamp(1, MAX_TOP_DONORS);
    let rows = state
        .procedures
        .execute("get_top_donors", &params(json!({ "limit_count": limit })))
        .await?;
    Ok(Json(rows))
}

/// GET /api/reports/member-search?term=
pub async fn member_search(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<TermParams>,
) -> AppResult<Json<Rows>> {
    let term = query.term.trim();
    if term.is_empty() {
        return Err(CoreError::Validation("Search term is required".into()).into());
    }
    let rows = state
        .procedures
        .execute("search_members", &params(json!({ "term": term })))
        .await?;
    Ok(Json(rows))
}

/// POST /api/reports/procedures/{name}
///
/// Query-string pairs play the role of headers: they fill parameters the
/// body leaves out. Answers `{"result": [...]}` or `{"error": ...}` (400).
pub async fn call_procedure(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(extra): Query<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Response {
    let call = ProcedureCall {
        procedure_name: Some(name),
        headers: extra
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect(),
        body: body.map_or(Value::Null, |Json(v)| v),
    };

    tracing::info!(user_id = user.user_id, procedure = ?call.procedure_name, "Dispatching procedure");
    let outcome = state.procedures.call_procedure(&call).await;
    let status = if outcome.procedure_error {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(outcome.body)).into_response()
}
