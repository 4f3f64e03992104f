//! Family household model and DTOs.

use church_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Family {
    pub id: DbId,
    pub family_name: String,
    pub address: Option<String>,
    pub home_phone: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFamily {
    pub family_name: String,
    pub address: Option<String>,
    pub home_phone: Option<String>,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFamily {
    pub family_name: Option<String>,
    pub address: Option<String>,
    pub home_phone: Option<String>,
}
