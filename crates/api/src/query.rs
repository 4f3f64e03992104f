//! Shared query parameter types for API handlers.

use church_core::error::CoreError;
use church_core::types::{Date, Timestamp};
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// `?active=true` restricts a listing to active rows.
#[derive(Debug, Deserialize)]
pub struct ActiveParams {
    #[serde(default)]
    pub active: bool,
}

/// `?start_date=&end_date=` as calendar dates.
#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub start_date: Date,
    pub end_date: Date,
}

/// `?start_date=&end_date=` as RFC 3339 timestamps, both or neither.
#[derive(Debug, Deserialize)]
pub struct TimestampRangeParams {
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

impl TimestampRangeParams {
    pub fn range(&self) -> Result<Option<(Timestamp, Timestamp)>, CoreError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Ok(Some((start, end))),
            (None, None) => Ok(None),
            _ => Err(CoreError::Validation(
                "start_date and end_date must be given together".into(),
            )),
        }
    }

    /// Both bounds, required.
    pub fn required(&self) -> Result<(Timestamp, Timestamp), CoreError> {
        self.range()?.ok_or_else(|| {
            CoreError::Validation("start_date and end_date are required".into())
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TermParams {
    #[serde(default)]
    pub term: String,
}

#[derive(Debug, Deserialize)]
pub struct NameParams {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
