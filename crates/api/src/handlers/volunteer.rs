//! Handlers for the `/volunteers` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use church_core::types::DbId;
use church_core::volunteer::{validate_period, validate_role};
use church_db::models::volunteer::{CreateVolunteer, UpdateVolunteer, Volunteer, VolunteerResponse};
use church_db::repositories::VolunteerRepo;

use super::ensure_member;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::state::AppState;

fn responses(volunteers: Vec<Volunteer>) -> Vec<VolunteerResponse> {
    let now = Utc::now();
    volunteers
        .into_iter()
        .map(|v| VolunteerResponse::new(v, now))
        .collect()
}

async fn ensure_volunteer(state: &AppState, id: DbId) -> AppResult<Volunteer> {
    VolunteerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Volunteer", id))
}

/// GET /api/volunteers
pub async fn list_volunteers(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<VolunteerResponse>>> {
    Ok(Json(responses(VolunteerRepo::list(&state.pool).await?)))
}

/// POST /api/volunteers
pub async fn create_volunteer(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateVolunteer>,
) -> AppResult<(StatusCode, Json<VolunteerResponse>)> {
    validate_role(&input.role)?;
    let now = Utc::now();
    validate_period(input.start_date.unwrap_or(now), input.end_date)?;
    ensure_member(&state, input.member_id).await?;

    let volunteer = VolunteerRepo::create(&state.pool, &input).await?;
    tracing::info!(volunteer_id = volunteer.id, member_id = volunteer.member_id, "Volunteer created");
    Ok((StatusCode::CREATED, Json(VolunteerResponse::new(volunteer, now))))
}

/// GET /api/volunteers/{id}
pub async fn get_volunteer(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<VolunteerResponse>> {
    let volunteer = ensure_volunteer(&state, id).await?;
    Ok(Json(VolunteerResponse::new(volunteer, Utc::now())))
}

/// PUT /api/volunteers/{id}
pub async fn update_volunteer(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateVolunteer>,
) -> AppResult<Json<VolunteerResponse>> {
    if let Some(role) = &input.role {
        validate_role(role)?;
    }
    let existing = ensure_volunteer(&state, id).await?;
    validate_period(
        input.start_date.unwrap_or(existing.start_date),
        input.end_date.or(existing.end_date),
    )?;

    let volunteer = VolunteerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Volunteer", id))?;
    Ok(Json(VolunteerResponse::new(volunteer, Utc::now())))
}

/// DELETE /api/volunteers/{id}
pub async fn delete_volunteer(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !VolunteerRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Volunteer", id));
    }
    tracing::info!(volunteer_id = id, "Volunteer deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/volunteers/member/{member_id}
pub async fn list_by_member(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(member_id): Path<DbId>,
) -> AppResult<Json<Vec<VolunteerResponse>>> {
    Ok(Json(responses(VolunteerRepo::list_by_member(&state.pool, member_id).await?)))
}

/// GET /api/volunteers/role/{role}
pub async fn list_by_role(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> AppResult<Json<Vec<VolunteerResponse>>> {
    Ok(Json(responses(VolunteerRepo::list_by_role(&state.pool, &role).await?)))
}
