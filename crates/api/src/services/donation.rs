//! Donation recording, lookups and per-period statistics.

use chrono::Utc;
use church_core::donation::{calculate_total, validate_donation, DonationStatistics, DonationType};
use church_core::error::CoreError;
use church_core::types::{DbId, Timestamp};
use church_db::models::donation::{CreateDonation, Donation};
use church_db::repositories::{DonationRepo, MemberRepo};
use church_db::DbPool;
use church_events::EventPublisher;
use rust_decimal::Decimal;

use super::db_error;

#[derive(Clone)]
pub struct DonationService {
    pool: DbPool,
    events: EventPublisher,
}

impl DonationService {
    pub fn new(pool: DbPool, events: EventPublisher) -> Self {
        Self { pool, events }
    }

    /// Validate, insert and publish `donation.created`. A missing date
    /// means now.
    pub async fn create(&self, mut input: CreateDonation, actor: Option<DbId>) -> Result<Donation, CoreError> {
        let now = Utc::now();
        let donation_date = *input.donation_date.get_or_insert(now);
        validate_donation(input.amount, donation_date, now)?;

        let member = match input.member_id {
            Some(member_id) => Some(
                MemberRepo::find_by_id(&self.pool, member_id)
                    .await
                    .map_err(db_error)?
                    .ok_or(CoreError::NotFound { entity: "Member", id: member_id })?,
            ),
            None => None,
        };

        let donation = DonationRepo::create(&self.pool, &input).await.map_err(db_error)?;
        tracing::info!(
            donation_id = donation.id,
            member_id = ?donation.member_id,
            amount = %donation.amount,
            "Donation created"
        );

        self.events.donation_created(&donation, member.as_ref(), actor);
        Ok(donation)
    }

    pub async fn find_by_id(&self, id: DbId) -> Result<Donation, CoreError> {
        DonationRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .ok_or(CoreError::NotFound { entity: "Donation", id })
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Donation>, CoreError> {
        DonationRepo::list(&self.pool, limit, offset).await.map_err(db_error)
    }

    pub async fn list_by_member(&self, member_id: DbId) -> Result<Vec<Donation>, CoreError> {
        DonationRepo::list_by_member(&self.pool, member_id)
            .await
            .map_err(db_error)
    }

    /// All donations of one type; both bounds or neither.
    pub async fn list_by_type_and_range(
        &self,
        kind: DonationType,
        range: Option<(Timestamp, Timestamp)>,
    ) -> Result<Vec<Donation>, CoreError> {
        match range {
            Some((start, end)) => {
                validate_range(start, end)?;
                DonationRepo::list_by_type_and_range(&self.pool, kind, start, end).await
            }
            None => DonationRepo::list_by_type(&self.pool, kind).await,
        }
        .map_err(db_error)
    }

    pub fn calculate_total(&self, donations: &[Donation]) -> Decimal {
        calculate_total(donations.iter().map(|d| d.amount))
    }

    pub async fn member_total(&self, member_id: DbId) -> Result<Decimal, CoreError> {
        DonationRepo::sum_by_member(&self.pool, member_id)
            .await
            .map_err(db_error)
    }

    /// Totals per type within `[start, end]`, every type present.
    pub async fn statistics(&self, start: Timestamp, end: Timestamp) -> Result<DonationStatistics, CoreError> {
        validate_range(start, end)?;
        let rows = DonationRepo::sum_by_type_in_range(&self.pool, start, end)
            .await
            .map_err(db_error)?;

        let totals = rows
            .into_iter()
            .map(|(kind, amount)| {
                kind.parse::<DonationType>()
                    .map(|k| (k, amount))
                    .map_err(|e| CoreError::Internal(format!("Stored donation type: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DonationStatistics::from_totals(totals, start, end))
    }

    pub async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        if DonationRepo::delete(&self.pool, id).await.map_err(db_error)? {
            tracing::info!(donation_id = id, "Donation deleted");
            Ok(())
        } else {
            Err(CoreError::NotFound { entity: "Donation", id })
        }
    }
}

fn validate_range(start: Timestamp, end: Timestamp) -> Result<(), CoreError> {
    if end < start {
        return Err(CoreError::Validation(
            "End date cannot be before start date".into(),
        ));
    }
    Ok(())
}
