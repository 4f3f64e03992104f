//! Member model. Inserts and updates take a validated
//! [`church_core::member::MemberDraft`].

use church_core::member::full_name;
use church_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Member {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
    pub address: Option<String>,
    pub membership_date: Date,
    pub baptism_date: Option<Date>,
    pub is_active: bool,
    pub family_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Member {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// API shape: the row plus its derived display name.
#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    #[serde(flatten)]
    pub member: Member,
    pub full_name: String,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        let full_name = member.full_name();
        MemberResponse { member, full_name }
    }
}
