//! Donation model and DTOs.
//!
//! Read queries join `members` so every row carries the linked member's
//! display name (`member_name`), which feeds the derived donor name.

use church_core::donation::{donor_name, DonationType};
use church_core::error::CoreError;
use church_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Donation {
    pub id: DbId,
    pub amount: Decimal,
    pub donation_type: String,
    pub member_id: Option<DbId>,
    pub anonymous: bool,
    pub notes: Option<String>,
    pub donation_date: Timestamp,
    pub created_at: Timestamp,
    #[serde(skip)]
    pub member_name: Option<String>,
}

impl Donation {
    pub fn kind(&self) -> Result<DonationType, CoreError> {
        self.donation_type.parse()
    }

    pub fn donor_name(&self) -> String {
        donor_name(self.anonymous, self.member_name.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDonation {
    pub amount: Decimal,
    pub donation_type: DonationType,
    pub member_id: Option<DbId>,
    #[serde(default)]
    pub anonymous: bool,
    pub notes: Option<String>,
    /// Defaults to the insert time.
    pub donation_date: Option<Timestamp>,
}

/// API shape: the row plus the derived donor name.
#[derive(Debug, Clone, Serialize)]
pub struct DonationResponse {
    #[serde(flatten)]
    pub donation: Donation,
    pub donor_name: String,
}

impl From<Donation> for DonationResponse {
    fn from(donation: Donation) -> Self {
        let donor_name = donation.donor_name();
        DonationResponse { donation, donor_name }
    }
}
