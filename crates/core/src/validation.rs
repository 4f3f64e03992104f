//! Field-level validation helpers shared by the member, user, donation and
//! email code paths.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Accepted email shape: local part of `[A-Za-z0-9+_.-]`, a domain, and a
/// top-level label of at least two letters.
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9+_.-]+@([A-Za-z0-9.-]+\.[A-Za-z]{2,})$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));

/// Check whether `email` has the accepted address shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Reject a value that is empty or whitespace-only.
///
/// `message` is used verbatim as the validation error text.
pub fn require_non_blank(value: &str, message: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(message.to_string()));
    }
    Ok(())
}

/// Reject a value shorter than `min` characters.
pub fn require_min_length(value: &str, min: usize, field: &str) -> Result<(), CoreError> {
    if value.chars().count() < min {
        return Err(CoreError::Validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}

/// Trim an optional string, collapsing blank values to `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Normalize an email address for storage and lookup (trimmed, lowercase).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn accepts_common_addresses() {
        assert!(is_valid_email("john.doe@example.com"));
        assert!(is_valid_email("a+tag@mail.church.org"));
        assert!(is_valid_email("x_y-z@sub.domain.io"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@domain.c"));
        assert!(!is_valid_email("us er@example.com"));
    }

    #[test]
    fn blank_values_are_rejected_with_given_message() {
        let err = require_non_blank("   ", "Username cannot be blank").unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg == "Username cannot be blank");
        assert!(require_non_blank(" ok ", "unused").is_ok());
    }

    #[test]
    fn min_length_counts_characters() {
        assert!(require_min_length("abc", 3, "Username").is_ok());
        let err = require_min_length("ab", 3, "Username").unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg == "Username must be at least 3 characters");
    }

    #[test]
    fn optional_values_are_trimmed_and_blank_dropped() {
        assert_eq!(normalize_optional(Some("  555-1234 ")), Some("555-1234".to_string()));
        assert_eq!(normalize_optional(Some("   ")), None);
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn email_normalization_lowercases() {
        assert_eq!(normalize_email("  John.Doe@Example.COM "), "john.doe@example.com");
    }
}
