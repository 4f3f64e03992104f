//! Handlers for the `/groups` resource and group membership.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use church_core::capacity::validate_limit;
use church_core::error::CoreError;
use church_core::types::DbId;
use church_core::validation::require_non_blank;
use church_db::models::group::{CreateGroup, Group, GroupJoin, GroupResponse, UpdateGroup};
use church_db::models::member::MemberResponse;
use church_db::repositories::GroupRepo;

use super::ensure_member;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::ActiveParams;
use crate::state::AppState;

const NAME_REQUIRED: &str = "Group name is required";

async fn ensure_group(state: &AppState, id: DbId) -> AppResult<Group> {
    GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Group", id))
}

async fn with_count(state: &AppState, group: Group) -> AppResult<GroupResponse> {
    let count = GroupRepo::count_members(&state.pool, group.id).await?;
    Ok(GroupResponse::new(group, count))
}

/// GET /api/groups?active=
pub async fn list_groups(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ActiveParams>,
) -> AppResult<Json<Vec<GroupResponse>>> {
    let groups = if params.active {
        GroupRepo::list_active(&state.pool).await?
    } else {
        GroupRepo::list(&state.pool).await?
    };

    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        out.push(with_count(&state, group).await?);
    }
    Ok(Json(out))
}

/// POST /api/groups
pub async fn create_group(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateGroup>,
) -> AppResult<(StatusCode, Json<GroupResponse>)> {
    require_non_blank(&input.name, NAME_REQUIRED)?;
    validate_limit(input.max_members, "Max members")?;
    if let Some(leader_id) = input.leader_id {
        ensure_member(&state, leader_id).await?;
    }

    let group = GroupRepo::create(&state.pool, &input).await?;
    tracing::info!(group_id = group.id, "Group created");
    Ok((StatusCode::CREATED, Json(GroupResponse::new(group, 0))))
}

/// GET /api/groups/{id}
pub async fn get_group(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<GroupResponse>> {
    let group = ensure_group(&state, id).await?;
    Ok(Json(with_count(&state, group).await?))
}

/// PUT /api/groups/{id}
pub async fn update_group(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGroup>,
) -> AppResult<Json<GroupResponse>> {
    if let Some(name) = &input.name {
        require_non_blank(name, NAME_REQUIRED)?;
    }
    validate_limit(input.max_members, "Max members")?;
    if let Some(leader_id) = input.leader_id {
        ensure_member(&state, leader_id).await?;
    }

    let group = GroupRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Group", id))?;
    Ok(Json(with_count(&state, group).await?))
}

/// DELETE /api/groups/{id}
pub async fn delete_group(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !GroupRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Group", id));
    }
    tracing::info!(group_id = id, "Group deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/groups/{id}/members
pub async fn list_members(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<MemberResponse>>> {
    ensure_group(&state, id).await?;
    let members = GroupRepo::list_members(&state.pool, id).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

/// POST /api/groups/{id}/members/{member_id}
///
/// Rejected when the member already belongs or the group is full.
pub async fn add_member(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path((id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<GroupResponse>> {
    let group = ensure_group(&state, id).await?;
    ensure_member(&state, member_id).await?;

    match GroupRepo::add_member(&state.pool, id, member_id).await? {
        GroupJoin::Added { member_count } => {
            tracing::info!(group_id = id, member_id, "Member added to group");
            Ok(Json(GroupResponse::new(group, member_count)))
        }
        GroupJoin::AlreadyMember => {
            Err(CoreError::Conflict("Member is already in this group".into()).into())
        }
        GroupJoin::Full => Err(CoreError::Conflict("Group is full".into()).into()),
    }
}

/// DELETE /api/groups/{id}/members/{member_id}
pub async fn remove_member(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    ensure_group(&state, id).await?;
    if !GroupRepo::remove_member(&state.pool, id, member_id).await? {
        return Err(AppError::NotFound(format!(
            "Member {member_id} is not in group {id}"
        )));
    }
    tracing::info!(group_id = id, member_id, "Member removed from group");
    Ok(StatusCode::NO_CONTENT)
}
