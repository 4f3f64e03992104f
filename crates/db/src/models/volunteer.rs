//! Volunteer assignment model and DTOs.

use church_core::types::{DbId, Timestamp};
use church_core::volunteer::is_current;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Volunteer {
    pub id: DbId,
    pub member_id: DbId,
    pub role: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Volunteer {
    pub fn is_current(&self, now: Timestamp) -> bool {
        is_current(self.is_active, self.end_date, now)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVolunteer {
    pub member_id: DbId,
    pub role: String,
    pub description: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVolunteer {
    pub role: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolunteerResponse {
    #[serde(flatten)]
    pub volunteer: Volunteer,
    pub is_current: bool,
}

impl VolunteerResponse {
    pub fn new(volunteer: Volunteer, now: Timestamp) -> Self {
        let is_current = volunteer.is_current(now);
        VolunteerResponse { volunteer, is_current }
    }
}
