//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the principal behind a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- `ADMIN` only.
//! - [`rbac::RequireRecordManager`] -- `ADMIN` or `PASTOR`.
//! - [`rbac::RequireRecordReader`] -- `ADMIN`, `PASTOR` or `VOLUNTEER`.
//! - [`rbac::RequireAuth`] -- any authenticated user.

pub mod auth;
pub mod rbac;
