//! Domain services. Each validates input, talks to the repositories and
//! returns `Result<_, CoreError>`; handlers convert into HTTP responses.

pub mod authentication;
pub mod donation;
pub mod member;

pub use authentication::{AuthTokens, AuthenticationService};
pub use donation::DonationService;
pub use member::MemberService;

use church_core::error::CoreError;

/// Any database failure a service does not handle itself.
pub(crate) fn db_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(err.to_string())
}
