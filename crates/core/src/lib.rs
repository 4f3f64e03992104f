//! Domain types and rules shared by every church backend crate.
//!
//! Nothing in here touches the database or the network: the modules hold
//! the validation, normalization and derived-value logic that the
//! repository, routing and HTTP layers build on.

pub mod audit;
pub mod capacity;
pub mod donation;
pub mod error;
pub mod family;
pub mod member;
pub mod roles;
pub mod types;
pub mod user;
pub mod validation;
pub mod volunteer;
