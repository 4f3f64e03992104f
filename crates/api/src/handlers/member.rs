//! Handlers for the `/members` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use church_core::member::MemberInput;
use church_core::types::DbId;
use church_db::models::member::MemberResponse;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireRecordManager, RequireRecordReader};
use crate::query::{DateRangeParams, TermParams};
use crate::state::AppState;

fn responses(members: Vec<church_db::models::member::Member>) -> Vec<MemberResponse> {
    members.into_iter().map(MemberResponse::from).collect()
}

/// GET /api/members -- active members only.
pub async fn list_members(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MemberResponse>>> {
    Ok(Json(responses(state.members.list_active().await?)))
}

/// POST /api/members
pub async fn create_member(
    RequireRecordManager(user): RequireRecordManager,
    State(state): State<AppState>,
    Json(input): Json<MemberInput>,
) -> AppResult<(StatusCode, Json<MemberResponse>)> {
    let member = state.members.create(input, Some(user.user_id)).await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

/// GET /api/members/{id}
pub async fn get_member(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MemberResponse>> {
    Ok(Json(state.members.find_by_id(id).await?.into()))
}

/// PUT /api/members/{id}
pub async fn update_member(
    RequireRecordManager(_user): RequireRecordManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MemberInput>,
) -> AppResult<Json<MemberResponse>> {
    Ok(Json(state.members.update(id, input).await?.into()))
}

/// DELETE /api/members/{id} -- soft delete, returns the deactivated member.
pub async fn deactivate_member(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MemberResponse>> {
    Ok(Json(state.members.deactivate(id).await?.into()))
}

/// GET /api/members/email/{email}
pub async fn get_member_by_email(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<MemberResponse>> {
    let member = state
        .members
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member not found with email: {email}")))?;
    Ok(Json(member.into()))
}

/// GET /api/members/search?term=
pub async fn search_members(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
    Query(params): Query<TermParams>,
) -> AppResult<Json<Vec<MemberResponse>>> {
    Ok(Json(responses(state.members.search(&params.term).await?)))
}

/// GET /api/members/family/{family_id}
pub async fn list_family_members(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
    Path(family_id): Path<DbId>,
) -> AppResult<Json<Vec<MemberResponse>>> {
    Ok(Json(responses(state.members.list_by_family(family_id).await?)))
}

/// GET /api/members/membership-range?start_date=&end_date=
pub async fn list_by_membership_range(
    RequireRecordReader(_user): RequireRecordReader,
    State(state): State<AppState>,
    Query(range): Query<DateRangeParams>,
) -> AppResult<Json<Vec<MemberResponse>>> {
    let members = state
        .members
        .list_by_membership_range(range.start_date, range.end_date)
        .await?;
    Ok(Json(responses(members)))
}
