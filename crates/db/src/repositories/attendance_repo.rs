//! Repository for the `attendance` table.

use church_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::attendance::{Attendance, CreateAttendance, DEFAULT_SERVICE_TYPE};

const COLUMNS: &str = "id, member_id, service_date, service_type, check_in_time, created_at";

pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Record a check-in, filling missing fields with today, the default
    /// service type and now.
    pub async fn create(pool: &PgPool, input: &CreateAttendance) -> Result<Attendance, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance (member_id, service_date, service_type, check_in_time)
             VALUES ($1, COALESCE($2, CURRENT_DATE), COALESCE($3, $4), COALESCE($5, NOW()))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(input.member_id)
            .bind(input.service_date)
            .bind(input.service_type.as_deref().map(str::trim).filter(|s| !s.is_empty()))
            .bind(DEFAULT_SERVICE_TYPE)
            .bind(input.check_in_time)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attendance WHERE id = $1");
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_member(pool: &PgPool, member_id: DbId) -> Result<Vec<Attendance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance WHERE member_id = $1
             ORDER BY service_date DESC, check_in_time DESC"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(member_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_service_date(pool: &PgPool, date: Date) -> Result<Vec<Attendance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance WHERE service_date = $1 ORDER BY check_in_time, id"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_service_type(
        pool: &PgPool,
        service_type: &str,
    ) -> Result<Vec<Attendance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance WHERE service_type = $1
             ORDER BY service_date DESC, check_in_time"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(service_type)
            .fetch_all(pool)
            .await
    }

    /// Check-ins with a service date in `[start, end]`.
    pub async fn list_by_date_range(
        pool: &PgPool,
        start: Date,
        end: Date,
    ) -> Result<Vec<Attendance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance WHERE service_date BETWEEN $1 AND $2
             ORDER BY service_date, check_in_time"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
