//! Handlers for the `/families` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use church_core::error::CoreError;
use church_core::family::{family_head, validate_family_name};
use church_core::types::DbId;
use church_db::models::family::{CreateFamily, Family, UpdateFamily};
use church_db::models::member::MemberResponse;
use church_db::repositories::FamilyRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireRecordManager, RequireRecordReader};
use crate::query::NameParams;
use crate::state::AppState;

async fn ensure_family(state: &AppState, id: DbId) -> AppResult<Family> {
    FamilyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Family", id))
}

/// GET /api/families
pub async fn list_families(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Family>>> {
    Ok(Json(FamilyRepo::list(&state.pool).await?))
}

/// POST /api/families
pub async fn create_family(
    RequireRecordManager(_user): RequireRecordManager,
    State(state): State<AppState>,
    Json(input): Json<CreateFamily>,
) -> AppResult<(StatusCode, Json<Family>)> {
    validate_family_name(&input.family_name)?;
    let family = FamilyRepo::create(&state.pool, &input).await?;
    tracing::info!(family_id = family.id, "Family created");
    Ok((StatusCode::CREATED, Json(family)))
}

/// GET /api/families/{id}
pub async fn get_family(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Family>> {
    Ok(Json(ensure_family(&state, id).await?))
}

/// PUT /api/families/{id}
pub async fn update_family(
    RequireRecordManager(_user): RequireRecordManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFamily>,
) -> AppResult<Json<Family>> {
    if let Some(name) = &input.family_name {
        validate_family_name(name)?;
    }
    let family = FamilyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Family", id))?;
    Ok(Json(family))
}

/// DELETE /api/families/{id}
pub async fn delete_family(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !FamilyRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Family", id));
    }
    tracing::info!(family_id = id, "Family deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/families/search?name=
pub async fn search_families(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> AppResult<Json<Vec<Family>>> {
    let name = params.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Name is required".into()).into());
    }
    Ok(Json(FamilyRepo::search_by_name(&state.pool, name).await?))
}

/// GET /api/families/{id}/members
pub async fn list_members(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<MemberResponse>>> {
    ensure_family(&state, id).await?;
    let members = state.members.list_by_family(id).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

/// GET /api/families/{id}/head -- the member recorded first.
pub async fn get_head(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MemberResponse>> {
    ensure_family(&state, id).await?;
    let members = state.members.list_by_family(id).await?;
    let head = family_head(&members, |m| m.created_at)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Family {id} has no members")))?;
    Ok(Json(head.into()))
}
