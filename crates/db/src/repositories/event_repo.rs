//! Repository for the `events` and `event_registrations` tables.

use church_core::capacity::is_full;
use church_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::like_pattern;
use crate::models::event::{
    CreateEvent, CreateEventRegistration, Event, EventRegistration, Registration, UpdateEvent,
};

const COLUMNS: &str = "id, name, description, start_date, end_date, location, max_capacity, \
                       is_active, created_at, updated_at";

const REGISTRATION_COLUMNS: &str = "id, event_id, member_id, registration_date, notes, \
                                    attended, created_at";

pub struct EventRepo;

impl EventRepo {
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (name, description, start_date, end_date, location,
                                 max_capacity, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.location)
            .bind(input.max_capacity)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events ORDER BY start_date, id");
        sqlx::query_as::<_, Event>(&query).fetch_all(pool).await
    }

    pub async fn list_active(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM events WHERE is_active = true ORDER BY start_date, id");
        sqlx::query_as::<_, Event>(&query).fetch_all(pool).await
    }

    /// Events starting within `[from, to]`.
    pub async fn list_by_start_range(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE start_date BETWEEN $1 AND $2 ORDER BY start_date, id"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    pub async fn search_by_location(pool: &PgPool, location: &str) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE location ILIKE $1 ORDER BY start_date, id"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(like_pattern(location))
            .fetch_all(pool)
            .await
    }

    /// Update an event. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                location = COALESCE($6, location),
                max_capacity = COALESCE($7, max_capacity),
                is_active = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.location)
            .bind(input.max_capacity)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn registration_count(pool: &PgPool, event_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await
    }
}

pub struct EventRegistrationRepo;

impl EventRegistrationRepo {
    /// Register a member, honouring `max_capacity`.
    ///
    /// Locks the event row so concurrent registrations are counted one at a
    /// time. Fails with `RowNotFound` when the event does not exist.
    pub async fn create(
        pool: &PgPool,
        event_id: DbId,
        input: &CreateEventRegistration,
    ) -> Result<Registration, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let max_capacity = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT max_capacity FROM events WHERE id = $1 FOR UPDATE",
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        let already = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM event_registrations WHERE event_id = $1 AND member_id = $2)",
        )
        .bind(event_id)
        .bind(input.member_id)
        .fetch_one(&mut *tx)
        .await?;
        if already {
            return Ok(Registration::AlreadyRegistered);
        }

        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;
        if is_full(max_capacity, count) {
            return Ok(Registration::Full);
        }

        let query = format!(
            "INSERT INTO event_registrations (event_id, member_id, notes)
             VALUES ($1, $2, $3)
             ON CONFLICT (event_id, member_id) DO NOTHING
             RETURNING {REGISTRATION_COLUMNS}"
        );
        let created = sqlx::query_as::<_, EventRegistration>(&query)
            .bind(event_id)
            .bind(input.member_id)
            .bind(&input.notes)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(created.map_or(Registration::AlreadyRegistered, Registration::Created))
    }

    pub async fn find_by_event_and_member(
        pool: &PgPool,
        event_id: DbId,
        member_id: DbId,
    ) -> Result<Option<EventRegistration>, sqlx::Error> {
        let query = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations
             WHERE event_id = $1 AND member_id = $2"
        );
        sqlx::query_as::<_, EventRegistration>(&query)
            .bind(event_id)
            .bind(member_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_event(pool: &PgPool, event_id: DbId) -> Result<Vec<EventRegistration>, sqlx::Error> {
        let query = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations
             WHERE event_id = $1 ORDER BY registration_date, id"
        );
        sqlx::query_as::<_, EventRegistration>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_member(pool: &PgPool, member_id: DbId) -> Result<Vec<EventRegistration>, sqlx::Error> {
        let query = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations
             WHERE member_id = $1 ORDER BY registration_date, id"
        );
        sqlx::query_as::<_, EventRegistration>(&query)
            .bind(member_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_attended(
        pool: &PgPool,
        event_id: DbId,
        attended: bool,
    ) -> Result<Vec<EventRegistration>, sqlx::Error> {
        let query = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations
             WHERE event_id = $1 AND attended = $2 ORDER BY registration_date, id"
        );
        sqlx::query_as::<_, EventRegistration>(&query)
            .bind(event_id)
            .bind(attended)
            .fetch_all(pool)
            .await
    }

    pub async fn mark_attended(
        pool: &PgPool,
        event_id: DbId,
        member_id: DbId,
        attended: bool,
    ) -> Result<Option<EventRegistration>, sqlx::Error> {
        let query = format!(
            "UPDATE event_registrations SET attended = $3
             WHERE event_id = $1 AND member_id = $2
             RETURNING {REGISTRATION_COLUMNS}"
        );
        sqlx::query_as::<_, EventRegistration>(&query)
            .bind(event_id)
            .bind(member_id)
            .bind(attended)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, event_id: DbId, member_id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM event_registrations WHERE event_id = $1 AND member_id = $2")
                .bind(event_id)
                .bind(member_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
