//! Small-group model and DTOs.

use church_core::capacity::Occupancy;
use church_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub leader_id: Option<DbId>,
    pub max_members: Option<i32>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    pub description: Option<String>,
    pub leader_id: Option<DbId>,
    pub max_members: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGroup {
    pub name: Option<String>,
    pub description: Option<String>,
    pub leader_id: Option<DbId>,
    pub max_members: Option<i32>,
    pub is_active: Option<bool>,
}

/// Group plus its current membership count and derived capacity.
#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    #[serde(flatten)]
    pub group: Group,
    pub member_count: i64,
    pub is_full: bool,
    pub available_spots: Option<i64>,
}

impl GroupResponse {
    pub fn new(group: Group, member_count: i64) -> Self {
        let occupancy = Occupancy::new(group.max_members, member_count);
        GroupResponse {
            group,
            member_count,
            is_full: occupancy.is_full,
            available_spots: occupancy.available_spots,
        }
    }
}

/// Outcome of [`GroupRepo::add_member`](crate::repositories::GroupRepo::add_member).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupJoin {
    Added { member_count: i64 },
    AlreadyMember,
    Full,
}
