//! Small response bodies shared by several handlers.

use church_core::donation::DonationType;
use church_core::types::DbId;
use rust_decimal::Decimal;
use serde::Serialize;

/// `{ "message": ... }` for actions with nothing else to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse { message: message.into() }
    }
}

/// Donation total for one member.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub member_id: DbId,
    pub total: Decimal,
}

/// Donation total for one type, optionally within a period.
#[derive(Debug, Serialize)]
pub struct TypeTotalResponse {
    pub donation_type: DonationType,
    pub donation_count: usize,
    pub total: Decimal,
}

/// Result of `POST /auth/validate`.
#[derive(Debug, Serialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<church_db::models::user::UserInfo>,
}
