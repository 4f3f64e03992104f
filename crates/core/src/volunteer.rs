//! Volunteer assignment rules.

use crate::error::CoreError;
use crate::types::Timestamp;
use crate::validation::require_non_blank;

pub fn validate_role(role: &str) -> Result<(), CoreError> {
    require_non_blank(role, "Role is required")
}

/// An assignment is current while active and not yet past its end date.
pub fn is_current(is_active: bool, end_date: Option<Timestamp>, now: Timestamp) -> bool {
    is_active && end_date.map_or(true, |end| end > now)
}

/// Reject an end date that precedes the start date.
pub fn validate_period(start_date: Timestamp, end_date: Option<Timestamp>) -> Result<(), CoreError> {
    match end_date {
        Some(end) if end < start_date => Err(CoreError::Validation(
            "End date cannot be before start date".into(),
        )),
        _ => Ok(()),
    }
}
