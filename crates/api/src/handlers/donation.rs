//! Handlers for the `/donations` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use church_core::donation::{DonationStatistics, DonationType};
use church_core::types::DbId;
use church_db::models::donation::{CreateDonation, Donation, DonationResponse};

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::{PaginationParams, TimestampRangeParams};
use crate::response::{TotalResponse, TypeTotalResponse};
use crate::state::AppState;

fn responses(donations: Vec<Donation>) -> Vec<DonationResponse> {
    donations.into_iter().map(DonationResponse::from).collect()
}

/// POST /api/donations
pub async fn create_donation(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateDonation>,
) -> AppResult<(StatusCode, Json<DonationResponse>)> {
    let donation = state.donations.create(input, Some(user.user_id)).await?;
    Ok((StatusCode::CREATED, Json(donation.into())))
}

/// GET /api/donations?limit=&offset=
pub async fn list_donations(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Vec<DonationResponse>>> {
    let donations = state.donations.list(page.limit(), page.offset()).await?;
    Ok(Json(responses(donations)))
}

/// GET /api/donations/{id}
pub async fn get_donation(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DonationResponse>> {
    Ok(Json(state.donations.find_by_id(id).await?.into()))
}

/// DELETE /api/donations/{id}
pub async fn delete_donation(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.donations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/donations/member/{member_id}
pub async fn list_member_donations(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(member_id): Path<DbId>,
) -> AppResult<Json<Vec<DonationResponse>>> {
    Ok(Json(responses(state.donations.list_by_member(member_id).await?)))
}

/// GET /api/donations/member/{member_id}/total
pub async fn member_total(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(member_id): Path<DbId>,
) -> AppResult<Json<TotalResponse>> {
    let total = state.donations.member_total(member_id).await?;
    Ok(Json(TotalResponse { member_id, total }))
}

/// GET /api/donations/type/{type}?start_date=&end_date=
pub async fn list_by_type(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(range): Query<TimestampRangeParams>,
) -> AppResult<Json<Vec<DonationResponse>>> {
    let kind: DonationType = kind.parse()?;
    let donations = state
        .donations
        .list_by_type_and_range(kind, range.range()?)
        .await?;
    Ok(Json(responses(donations)))
}

/// GET /api/donations/type/{type}/total?start_date=&end_date=
pub async fn type_total(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(range): Query<TimestampRangeParams>,
) -> AppResult<Json<TypeTotalResponse>> {
    let donation_type: DonationType = kind.parse()?;
    let donations = state
        .donations
        .list_by_type_and_range(donation_type, range.range()?)
        .await?;
    Ok(Json(TypeTotalResponse {
        donation_type,
        donation_count: donations.len(),
        total: state.donations.calculate_total(&donations),
    }))
}

/// GET /api/donations/statistics?start_date=&end_date=
pub async fn statistics(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(range): Query<TimestampRangeParams>,
) -> AppResult<Json<DonationStatistics>> {
    let (start, end) = range.required()?;
    Ok(Json(state.donations.statistics(start, end).await?))
}
