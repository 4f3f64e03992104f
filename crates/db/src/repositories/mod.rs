//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod attendance_repo;
pub mod audit_repo;
pub mod donation_repo;
pub mod event_repo;
pub mod family_repo;
pub mod group_repo;
pub mod member_repo;
pub mod session_repo;
pub mod user_repo;
pub mod volunteer_repo;

pub use attendance_repo::AttendanceRepo;
pub use audit_repo::AuditLogRepo;
pub use donation_repo::DonationRepo;
pub use event_repo::{EventRegistrationRepo, EventRepo};
pub use family_repo::FamilyRepo;
pub use group_repo::GroupRepo;
pub use member_repo::MemberRepo;
pub use session_repo::{PasswordResetRepo, SessionRepo};
pub use user_repo::UserRepo;
pub use volunteer_repo::VolunteerRepo;

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("john"), "%john%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
