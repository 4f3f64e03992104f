//! Handlers for the `/attendance` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use church_core::error::CoreError;
use church_core::types::{Date, DbId};
use church_db::models::attendance::{Attendance, CreateAttendance};
use church_db::repositories::AttendanceRepo;

use super::ensure_member;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::DateRangeParams;
use crate::state::AppState;

/// POST /api/attendance -- check a member in.
pub async fn record_attendance(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateAttendance>,
) -> AppResult<(StatusCode, Json<Attendance>)> {
    ensure_member(&state, input.member_id).await?;
    let attendance = AttendanceRepo::create(&state.pool, &input).await?;
    tracing::info!(
        attendance_id = attendance.id,
        member_id = attendance.member_id,
        service_date = %attendance.service_date,
        "Attendance recorded"
    );
    Ok((StatusCode::CREATED, Json(attendance)))
}

/// GET /api/attendance/member/{member_id}
pub async fn list_by_member(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(member_id): Path<DbId>,
) -> AppResult<Json<Vec<Attendance>>> {
    Ok(Json(AttendanceRepo::list_by_member(&state.pool, member_id).await?))
}

/// GET /api/attendance/date/{service_date}
pub async fn list_by_date(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(service_date): Path<Date>,
) -> AppResult<Json<Vec<Attendance>>> {
    Ok(Json(AttendanceRepo::list_by_service_date(&state.pool, service_date).await?))
}

/// GET /api/attendance/range?start_date=&end_date=
pub async fn list_by_range(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(range): Query<DateRangeParams>,
) -> AppResult<Json<Vec<Attendance>>> {
    if range.end_date < range.start_date {
        return Err(CoreError::Validation("End date cannot be before start date".into()).into());
    }
    let rows = AttendanceRepo::list_by_date_range(&state.pool, range.start_date, range.end_date).await?;
    Ok(Json(rows))
}

/// DELETE /api/attendance/{id}
pub async fn delete_attendance(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AttendanceRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Attendance", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
