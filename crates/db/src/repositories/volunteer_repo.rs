//! Repository for the `volunteers` table.

use church_core::types::DbId;
use sqlx::PgPool;

use crate::models::volunteer::{CreateVolunteer, UpdateVolunteer, Volunteer};

const COLUMNS: &str = "id, member_id, role, description, start_date, end_date, is_active, \
                       created_at, updated_at";

pub struct VolunteerRepo;

impl VolunteerRepo {
    pub async fn create(pool: &PgPool, input: &CreateVolunteer) -> Result<Volunteer, sqlx::Error> {
        let query = format!(
            "INSERT INTO volunteers (member_id, role, description, start_date, end_date, is_active)
             VALUES ($1, $2, $3, COALESCE($4, NOW()), $5, COALESCE($6, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Volunteer>(&query)
            .bind(input.member_id)
            .bind(input.role.trim())
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Volunteer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM volunteers WHERE id = $1");
        sqlx::query_as::<_, Volunteer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Volunteer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM volunteers ORDER BY start_date DESC, id");
        sqlx::query_as::<_, Volunteer>(&query).fetch_all(pool).await
    }

    pub async fn list_by_member(pool: &PgPool, member_id: DbId) -> Result<Vec<Volunteer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM volunteers WHERE member_id = $1 ORDER BY start_date DESC, id"
        );
        sqlx::query_as::<_, Volunteer>(&query)
            .bind(member_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_active(pool: &PgPool) -> Result<Vec<Volunteer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM volunteers WHERE is_active = true ORDER BY start_date DESC, id"
        );
        sqlx::query_as::<_, Volunteer>(&query).fetch_all(pool).await
    }

    /// Case-insensitive exact match on the role name.
    pub async fn list_by_role(pool: &PgPool, role: &str) -> Result<Vec<Volunteer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM volunteers WHERE LOWER(role) = LOWER($1)
             ORDER BY start_date DESC, id"
        );
        sqlx::query_as::<_, Volunteer>(&query)
            .bind(role.trim())
            .fetch_all(pool)
            .await
    }

    /// Update an assignment. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVolunteer,
    ) -> Result<Option<Volunteer>, sqlx::Error> {
        let query = format!(
            "UPDATE volunteers SET
                role = COALESCE($2, role),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Volunteer>(&query)
            .bind(id)
            .bind(input.role.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM volunteers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
