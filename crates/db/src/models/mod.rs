//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Where the table is mutable, an update DTO with all-`Option` fields

pub mod attendance;
pub mod audit;
pub mod donation;
pub mod event;
pub mod family;
pub mod group;
pub mod member;
pub mod session;
pub mod user;
pub mod volunteer;
