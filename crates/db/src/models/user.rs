//! User account model and DTOs.

use church_core::error::CoreError;
use church_core::roles::RoleType;
use church_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full row from the `users` table.
///
/// Contains the password hash; never serialize this directly. Use
/// [`UserInfo`] for API output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Parse the stored role name. The column CHECK constraint keeps this
    /// in sync with [`RoleType`].
    pub fn role_type(&self) -> Result<RoleType, CoreError> {
        self.role.parse()
    }
}

/// Public user representation (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub enabled: bool,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            enabled: user.enabled,
        }
    }
}

/// DTO for inserting a user whose password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: RoleType,
}
