//! Repository for the `members` table.

use church_core::member::MemberDraft;
use church_core::types::{Date, DbId};
use sqlx::PgPool;

use super::like_pattern;
use crate::models::member::Member;

const COLUMNS: &str = "id, first_name, last_name, email, phone_number, date_of_birth, \
                       address, membership_date, baptism_date, is_active, family_id, \
                       user_id, created_at, updated_at";

/// Default listing order.
const ORDER: &str = "ORDER BY last_name, first_name, id";

pub struct MemberRepo;

impl MemberRepo {
    /// Insert a new member, returning the created row.
    pub async fn create(pool: &PgPool, draft: &MemberDraft) -> Result<Member, sqlx::Error> {
        let query = format!(
            "INSERT INTO members (first_name, last_name, email, phone_number, date_of_birth,
                                  address, membership_date, baptism_date, is_active,
                                  family_id, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(&draft.first_name)
            .bind(&draft.last_name)
            .bind(&draft.email)
            .bind(&draft.phone_number)
            .bind(draft.date_of_birth)
            .bind(&draft.address)
            .bind(draft.membership_date)
            .bind(draft.baptism_date)
            .bind(draft.is_active)
            .bind(draft.family_id)
            .bind(draft.user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Member>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE id = $1");
        sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a member by email. Emails are stored lowercased.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Member>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE email = LOWER($1)");
        sqlx::query_as::<_, Member>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM members WHERE email = LOWER($1))",
        )
        .bind(email)
        .fetch_one(pool)
        .await
    }

    pub async fn list_active(pool: &PgPool) -> Result<Vec<Member>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE is_active = true {ORDER}");
        sqlx::query_as::<_, Member>(&query).fetch_all(pool).await
    }

    /// Family members, oldest record first so the head comes first.
    pub async fn list_by_family(pool: &PgPool, family_id: DbId) -> Result<Vec<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM members WHERE family_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(family_id)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring match on first or last name.
    pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM members
             WHERE first_name ILIKE $1 OR last_name ILIKE $1
             {ORDER}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(like_pattern(term))
            .fetch_all(pool)
            .await
    }

    /// Members who joined within `[start, end]` (inclusive).
    pub async fn list_by_membership_date_range(
        pool: &PgPool,
        start: Date,
        end: Date,
    ) -> Result<Vec<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM members
             WHERE membership_date BETWEEN $1 AND $2
             ORDER BY membership_date, id"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// Replace every editable column. Returns `None` if no such member.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        draft: &MemberDraft,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query = format!(
            "UPDATE members SET
                first_name = $2,
                last_name = $3,
                email = $4,
                phone_number = $5,
                date_of_birth = $6,
                address = $7,
                membership_date = $8,
                baptism_date = $9,
                is_active = $10,
                family_id = $11,
                user_id = $12
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .bind(&draft.first_name)
            .bind(&draft.last_name)
            .bind(&draft.email)
            .bind(&draft.phone_number)
            .bind(draft.date_of_birth)
            .bind(&draft.address)
            .bind(draft.membership_date)
            .bind(draft.baptism_date)
            .bind(draft.is_active)
            .bind(draft.family_id)
            .bind(draft.user_id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete: set `is_active = false` and return the row.
    ///
    /// Deactivating an already inactive member is a no-op that still
    /// returns the row.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<Option<Member>, sqlx::Error> {
        let query = format!(
            "UPDATE members SET is_active = false WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Hard delete. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
