//! Repository for the `donations` table.
//!
//! Reads go through `donations d LEFT JOIN members m` so each row carries
//! the linked member's display name.

use church_core::donation::DonationType;
use church_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::donation::{CreateDonation, Donation};

/// Select list for the joined read shape.
const COLUMNS: &str = "d.id, d.amount, d.donation_type, d.member_id, d.anonymous, d.notes, \
                       d.donation_date, d.created_at, \
                       CASE WHEN m.id IS NULL THEN NULL \
                            ELSE m.first_name || ' ' || m.last_name END AS member_name";

const FROM: &str = "donations d LEFT JOIN members m ON m.id = d.member_id";

const ORDER: &str = "ORDER BY d.donation_date DESC, d.id DESC";

pub struct DonationRepo;

impl DonationRepo {
    /// Insert a donation and return it in the joined read shape.
    pub async fn create(pool: &PgPool, input: &CreateDonation) -> Result<Donation, sqlx::Error> {
        let query = format!(
            "WITH d AS (
                INSERT INTO donations (amount, donation_type, member_id, anonymous, notes,
                                       donation_date)
                VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
                RETURNING *
             )
             SELECT {COLUMNS} FROM d LEFT JOIN members m ON m.id = d.member_id"
        );
        sqlx::query_as::<_, Donation>(&query)
            .bind(input.amount)
            .bind(input.donation_type.as_str())
            .bind(input.member_id)
            .bind(input.anonymous)
            .bind(&input.notes)
            .bind(input.donation_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Donation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE d.id = $1");
        sqlx::query_as::<_, Donation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Page through all donations, newest first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Donation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} {ORDER} LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Donation>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_member(pool: &PgPool, member_id: DbId) -> Result<Vec<Donation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE d.member_id = $1 {ORDER}");
        sqlx::query_as::<_, Donation>(&query)
            .bind(member_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_type(pool: &PgPool, kind: DonationType) -> Result<Vec<Donation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE d.donation_type = $1 {ORDER}");
        sqlx::query_as::<_, Donation>(&query)
            .bind(kind.as_str())
            .fetch_all(pool)
            .await
    }

    /// Donations of one type dated within `[start, end]`.
    pub async fn list_by_type_and_range(
        pool: &PgPool,
        kind: DonationType,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Donation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             WHERE d.donation_type = $1 AND d.donation_date BETWEEN $2 AND $3
             {ORDER}"
        );
        sqlx::query_as::<_, Donation>(&query)
            .bind(kind.as_str())
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_range(
        pool: &PgPool,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Donation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM} WHERE d.donation_date BETWEEN $1 AND $2 {ORDER}"
        );
        sqlx::query_as::<_, Donation>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_anonymous(pool: &PgPool, anonymous: bool) -> Result<Vec<Donation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE d.anonymous = $1 {ORDER}");
        sqlx::query_as::<_, Donation>(&query)
            .bind(anonymous)
            .fetch_all(pool)
            .await
    }

    /// Lifetime total for a member; zero when they have no donations.
    pub async fn sum_by_member(pool: &PgPool, member_id: DbId) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM donations WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_one(pool)
        .await
    }

    /// Per-type totals within `[start, end]`. Types with no donations are
    /// absent from the result.
    pub async fn sum_by_type_in_range(
        pool: &PgPool,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<(String, Decimal)>, sqlx::Error> {
        sqlx::query_as::<_, (String, Decimal)>(
            "SELECT donation_type, COALESCE(SUM(amount), 0)
             FROM donations
             WHERE donation_date BETWEEN $1 AND $2
             GROUP BY donation_type
             ORDER BY donation_type",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM donations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
