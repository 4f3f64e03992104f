//! Event and event-registration models.

use church_core::capacity::Occupancy;
use church_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub location: Option<String>,
    pub max_capacity: Option<i32>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub location: Option<String>,
    pub max_capacity: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEvent {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub location: Option<String>,
    pub max_capacity: Option<i32>,
    pub is_active: Option<bool>,
}

/// Event plus its registration count and derived capacity.
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub registration_count: i64,
    pub is_full: bool,
    pub available_spots: Option<i64>,
}

impl EventResponse {
    pub fn new(event: Event, registration_count: i64) -> Self {
        let occupancy = Occupancy::new(event.max_capacity, registration_count);
        EventResponse {
            event,
            registration_count,
            is_full: occupancy.is_full,
            available_spots: occupancy.available_spots,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventRegistration {
    pub id: DbId,
    pub event_id: DbId,
    pub member_id: DbId,
    pub registration_date: Timestamp,
    pub notes: Option<String>,
    pub attended: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRegistration {
    pub member_id: DbId,
    pub notes: Option<String>,
}

/// Outcome of [`EventRegistrationRepo::create`](crate::repositories::EventRegistrationRepo::create).
#[derive(Debug, Clone)]
pub enum Registration {
    Created(EventRegistration),
    AlreadyRegistered,
    Full,
}
