//! User roles and the access rules attached to them.
//!
//! Role names are stored in the `users.role` column and embedded in JWT
//! claims as their upper-case names (`"ADMIN"`, `"PASTOR"`, ...). They must
//! match the CHECK constraint in the `create_users` migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_PASTOR: &str = "PASTOR";
pub const ROLE_MEMBER: &str = "MEMBER";
pub const ROLE_VOLUNTEER: &str = "VOLUNTEER";
pub const ROLE_VISITOR: &str = "VISITOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleType {
    Admin,
    Pastor,
    #[default]
    Member,
    Volunteer,
    Visitor,
}

impl RoleType {
    pub const ALL: [RoleType; 5] = [
        RoleType::Admin,
        RoleType::Pastor,
        RoleType::Member,
        RoleType::Volunteer,
        RoleType::Visitor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoleType::Admin => ROLE_ADMIN,
            RoleType::Pastor => ROLE_PASTOR,
            RoleType::Member => ROLE_MEMBER,
            RoleType::Volunteer => ROLE_VOLUNTEER,
            RoleType::Visitor => ROLE_VISITOR,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RoleType::Admin => "Administrator with full access",
            RoleType::Pastor => "Church pastor with elevated privileges",
            RoleType::Member => "Regular church member",
            RoleType::Volunteer => "Church volunteer",
            RoleType::Visitor => "Church visitor",
        }
    }

    /// Authority string, e.g. `ROLE_ADMIN`.
    pub fn authority(self) -> String {
        format!("ROLE_{}", self.as_str())
    }

    /// Roles that may delete records of any kind.
    pub fn can_delete(self) -> bool {
        self == RoleType::Admin
    }

    /// Roles that may create or update member and family records.
    pub fn can_manage_records(self) -> bool {
        matches!(self, RoleType::Admin | RoleType::Pastor)
    }

    /// Roles that may read member and family records.
    pub fn can_read_records(self) -> bool {
        matches!(
            self,
            RoleType::Admin | RoleType::Pastor | RoleType::Volunteer
        )
    }

    /// Roles that only an administrator may hand out at registration.
    pub fn requires_admin_to_grant(self) -> bool {
        matches!(
            self,
            RoleType::Admin | RoleType::Pastor | RoleType::Volunteer
        )
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            ROLE_ADMIN => Ok(RoleType::Admin),
            ROLE_PASTOR => Ok(RoleType::Pastor),
            ROLE_MEMBER => Ok(RoleType::Member),
            ROLE_VOLUNTEER => Ok(RoleType::Volunteer),
            ROLE_VISITOR => Ok(RoleType::Visitor),
            other => Err(CoreError::Validation(format!("Unknown role: {other}"))),
        }
    }
}
