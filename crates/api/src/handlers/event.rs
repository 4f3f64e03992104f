//! Handlers for the `/events` resource and event registrations.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use church_core::capacity::validate_limit;
use church_core::error::CoreError;
use church_core::types::{DbId, Timestamp};
use church_core::validation::require_non_blank;
use church_db::models::event::{
    CreateEvent, CreateEventRegistration, Event, EventRegistration, EventResponse, Registration,
    UpdateEvent,
};
use church_db::repositories::{EventRegistrationRepo, EventRepo};
use serde::Deserialize;

use super::ensure_member;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::ActiveParams;
use crate::state::AppState;

const NAME_REQUIRED: &str = "Event name is required";

#[derive(Debug, Deserialize)]
pub struct AttendedRequest {
    #[serde(default = "default_attended")]
    pub attended: bool,
}

fn default_attended() -> bool {
    true
}

fn validate_dates(start: Timestamp, end: Option<Timestamp>) -> Result<(), CoreError> {
    match end {
        Some(end) if end < start => Err(CoreError::Validation(
            "End date cannot be before start date".into(),
        )),
        _ => Ok(()),
    }
}

async fn ensure_event(state: &AppState, id: DbId) -> AppResult<Event> {
    EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Event", id))
}

async fn with_count(state: &AppState, event: Event) -> AppResult<EventResponse> {
    let count = EventRepo::registration_count(&state.pool, event.id).await?;
    Ok(EventResponse::new(event, count))
}

/// GET /api/events?active=
pub async fn list_events(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ActiveParams>,
) -> AppResult<Json<Vec<EventResponse>>> {
    let events = if params.active {
        EventRepo::list_active(&state.pool).await?
    } else {
        EventRepo::list(&state.pool).await?
    };

    let mut out = Vec::with_capacity(events.len());
    for event in events {
        out.push(with_count(&state, event).await?);
    }
    Ok(Json(out))
}

/// POST /api/events
pub async fn create_event(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<EventResponse>)> {
    require_non_blank(&input.name, NAME_REQUIRED)?;
    validate_dates(input.start_date, input.end_date)?;
    validate_limit(input.max_capacity, "Max capacity")?;

    let event = EventRepo::create(&state.pool, &input).await?;
    tracing::info!(event_id = event.id, "Event created");
    Ok((StatusCode::CREATED, Json(EventResponse::new(event, 0))))
}

/// GET /api/events/{id}
pub async fn get_event(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<EventResponse>> {
    let event = ensure_event(&state, id).await?;
    Ok(Json(with_count(&state, event).await?))
}

/// PUT /api/events/{id}
pub async fn update_event(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<Json<EventResponse>> {
    if let Some(name) = &input.name {
        require_non_blank(name, NAME_REQUIRED)?;
    }
    validate_limit(input.max_capacity, "Max capacity")?;

    let existing = ensure_event(&state, id).await?;
    validate_dates(
        input.start_date.unwrap_or(existing.start_date),
        input.end_date.or(existing.end_date),
    )?;

    let event = EventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Event", id))?;
    Ok(Json(with_count(&state, event).await?))
}

/// DELETE /api/events/{id}
pub async fn delete_event(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !EventRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Event", id));
    }
    tracing::info!(event_id = id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/events/{id}/registrations
pub async fn list_registrations(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<EventRegistration>>> {
    ensure_event(&state, id).await?;
    Ok(Json(EventRegistrationRepo::list_by_event(&state.pool, id).await?))
}

/// POST /api/events/{id}/registrations
///
/// Rejected when the member is already registered or the event is full.
pub async fn register_member(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateEventRegistration>,
) -> AppResult<(StatusCode, Json<EventRegistration>)> {
    ensure_event(&state, id).await?;
    ensure_member(&state, input.member_id).await?;

    match EventRegistrationRepo::create(&state.pool, id, &input).await? {
        Registration::Created(registration) => {
            tracing::info!(event_id = id, member_id = input.member_id, "Member registered for event");
            Ok((StatusCode::CREATED, Json(registration)))
        }
        Registration::AlreadyRegistered => Err(CoreError::Conflict(
            "Member is already registered for this event".into(),
        )
        .into()),
        Registration::Full => Err(CoreError::Conflict("Event is full".into()).into()),
    }
}

/// PUT /api/events/{id}/registrations/{member_id}/attended
pub async fn mark_attended(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path((id, member_id)): Path<(DbId, DbId)>,
    body: Option<Json<AttendedRequest>>,
) -> AppResult<Json<EventRegistration>> {
    let attended = body.map_or(true, |Json(b)| b.attended);
    let registration = EventRegistrationRepo::mark_attended(&state.pool, id, member_id, attended)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Member {member_id} is not registered for event {id}"))
        })?;
    Ok(Json(registration))
}

/// DELETE /api/events/{id}/registrations/{member_id}
pub async fn cancel_registration(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !EventRegistrationRepo::delete(&state.pool, id, member_id).await? {
        return Err(AppError::NotFound(format!(
            "Member {member_id} is not registered for event {id}"
        )));
    }
    tracing::info!(event_id = id, member_id, "Event registration cancelled");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn end_before_start_is_rejected() {
        let now = Utc::now();
        assert!(validate_dates(now, None).is_ok());
        assert!(validate_dates(now, Some(now + Duration::hours(2))).is_ok());
        assert!(validate_dates(now, Some(now - Duration::hours(2))).is_err());
    }
}
