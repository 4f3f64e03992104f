//! Repository for the `families` table.

use church_core::types::DbId;
use sqlx::PgPool;

use super::like_pattern;
use crate::models::family::{CreateFamily, Family, UpdateFamily};

const COLUMNS: &str = "id, family_name, address, home_phone, created_at, updated_at";

pub struct FamilyRepo;

impl FamilyRepo {
    pub async fn create(pool: &PgPool, input: &CreateFamily) -> Result<Family, sqlx::Error> {
        let query = format!(
            "INSERT INTO families (family_name, address, home_phone)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Family>(&query)
            .bind(input.family_name.trim())
            .bind(&input.address)
            .bind(&input.home_phone)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Family>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM families WHERE id = $1");
        sqlx::query_as::<_, Family>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Family>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM families ORDER BY family_name, id");
        sqlx::query_as::<_, Family>(&query).fetch_all(pool).await
    }

    pub async fn search_by_name(pool: &PgPool, name: &str) -> Result<Vec<Family>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM families WHERE family_name ILIKE $1 ORDER BY family_name, id"
        );
        sqlx::query_as::<_, Family>(&query)
            .bind(like_pattern(name))
            .fetch_all(pool)
            .await
    }

    pub async fn search_by_address(pool: &PgPool, address: &str) -> Result<Vec<Family>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM families WHERE address ILIKE $1 ORDER BY family_name, id"
        );
        sqlx::query_as::<_, Family>(&query)
            .bind(like_pattern(address))
            .fetch_all(pool)
            .await
    }

    /// Update a family. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFamily,
    ) -> Result<Option<Family>, sqlx::Error> {
        let query = format!(
            "UPDATE families SET
                family_name = COALESCE($2, family_name),
                address = COALESCE($3, address),
                home_phone = COALESCE($4, home_phone)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Family>(&query)
            .bind(id)
            .bind(input.family_name.as_deref().map(str::trim))
            .bind(&input.address)
            .bind(&input.home_phone)
            .fetch_optional(pool)
            .await
    }

    /// Delete a family. Members keep their rows with `family_id` cleared.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM families WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
