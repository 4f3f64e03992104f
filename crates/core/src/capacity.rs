//! Capacity arithmetic shared by groups (`max_members`) and events
//! (`max_capacity`). A `None` limit means uncapped.

use serde::Serialize;

use crate::error::CoreError;

/// True when a capped container has no free slot left.
pub fn is_full(limit: Option<i32>, taken: i64) -> bool {
    match limit {
        Some(max) => taken >= i64::from(max),
        None => false,
    }
}

/// Free slots remaining, clamped at zero. `None` when uncapped.
pub fn available_spots(limit: Option<i32>, taken: i64) -> Option<i64> {
    limit.map(|max| (i64::from(max) - taken).max(0))
}

/// Reject a non-positive limit; `None` is always accepted.
pub fn validate_limit(limit: Option<i32>, field: &str) -> Result<(), CoreError> {
    match limit {
        Some(max) if max <= 0 => Err(CoreError::Validation(format!(
            "{field} must be greater than 0"
        ))),
        _ => Ok(()),
    }
}

/// Snapshot returned alongside group and event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub taken: i64,
    pub is_full: bool,
    pub available_spots: Option<i64>,
}

impl Occupancy {
    pub fn new(limit: Option<i32>, taken: i64) -> Self {
        Occupancy {
            taken,
            is_full: is_full(limit, taken),
            available_spots: available_spots(limit, taken),
        }
    }
}
