//! Service attendance model.

use church_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_SERVICE_TYPE: &str = "Sunday Service";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attendance {
    pub id: DbId,
    pub member_id: DbId,
    pub service_date: Date,
    pub service_type: String,
    pub check_in_time: Timestamp,
    pub created_at: Timestamp,
}

/// Missing fields fall back to today, [`DEFAULT_SERVICE_TYPE`] and now.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAttendance {
    pub member_id: DbId,
    pub service_date: Option<Date>,
    pub service_type: Option<String>,
    pub check_in_time: Option<Timestamp>,
}
