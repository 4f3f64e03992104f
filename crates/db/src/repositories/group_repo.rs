//! Repository for the `groups` and `group_members` tables.

use church_core::capacity::is_full;
use church_core::types::DbId;
use sqlx::PgPool;

use super::like_pattern;
use crate::models::group::{CreateGroup, Group, GroupJoin, UpdateGroup};
use crate::models::member::Member;

const COLUMNS: &str = "id, name, description, leader_id, max_members, is_active, \
                       created_at, updated_at";

/// Member columns qualified for joins through `group_members`.
const MEMBER_COLUMNS: &str = "m.id, m.first_name, m.last_name, m.email, m.phone_number, \
                              m.date_of_birth, m.address, m.membership_date, m.baptism_date, \
                              m.is_active, m.family_id, m.user_id, m.created_at, m.updated_at";

pub struct GroupRepo;

impl GroupRepo {
    pub async fn create(pool: &PgPool, input: &CreateGroup) -> Result<Group, sqlx::Error> {
        let query = format!(
            "INSERT INTO groups (name, description, leader_id, max_members, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.leader_id)
            .bind(input.max_members)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE id = $1");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups ORDER BY name, id");
        sqlx::query_as::<_, Group>(&query).fetch_all(pool).await
    }

    pub async fn list_active(pool: &PgPool) -> Result<Vec<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE is_active = true ORDER BY name, id");
        sqlx::query_as::<_, Group>(&query).fetch_all(pool).await
    }

    pub async fn list_by_leader(pool: &PgPool, leader_id: DbId) -> Result<Vec<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE leader_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Group>(&query)
            .bind(leader_id)
            .fetch_all(pool)
            .await
    }

    pub async fn search_by_name(pool: &PgPool, name: &str) -> Result<Vec<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE name ILIKE $1 ORDER BY name, id");
        sqlx::query_as::<_, Group>(&query)
            .bind(like_pattern(name))
            .fetch_all(pool)
            .await
    }

    /// Update a group. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGroup,
    ) -> Result<Option<Group>, sqlx::Error> {
        let query = format!(
            "UPDATE groups SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                leader_id = COALESCE($4, leader_id),
                max_members = COALESCE($5, max_members),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.leader_id)
            .bind(input.max_members)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Add a member to a group, honouring `max_members`.
    ///
    /// The group row is locked for the duration of the transaction so
    /// concurrent joins see each other's inserts. Fails with `RowNotFound`
    /// when the group does not exist.
    pub async fn add_member(pool: &PgPool, group_id: DbId, member_id: DbId) -> Result<GroupJoin, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let max_members = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT max_members FROM groups WHERE id = $1 FOR UPDATE",
        )
        .bind(group_id)
        .fetch_one(&mut *tx)
        .await?;

        let already = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM group_members WHERE group_id = $1 AND member_id = $2)",
        )
        .bind(group_id)
        .bind(member_id)
        .fetch_one(&mut *tx)
        .await?;
        if already {
            return Ok(GroupJoin::AlreadyMember);
        }

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(&mut *tx)
            .await?;
        if is_full(max_members, count) {
            return Ok(GroupJoin::Full);
        }

        let inserted = sqlx::query(
            "INSERT INTO group_members (group_id, member_id) VALUES ($1, $2)
             ON CONFLICT (group_id, member_id) DO NOTHING",
        )
        .bind(group_id)
        .bind(member_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;
        tx.commit().await?;

        Ok(if inserted {
            GroupJoin::Added { member_count: count + 1 }
        } else {
            GroupJoin::AlreadyMember
        })
    }

    /// Remove a member from a group. Returns `false` if not a member.
    pub async fn remove_member(
        pool: &PgPool,
        group_id: DbId,
        member_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND member_id = $2")
            .bind(group_id)
            .bind(member_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_members(pool: &PgPool, group_id: DbId) -> Result<Vec<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM group_members gm
             JOIN members m ON m.id = gm.member_id
             WHERE gm.group_id = $1
             ORDER BY gm.joined_at, m.id"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_members(pool: &PgPool, group_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(pool)
            .await
    }
}
