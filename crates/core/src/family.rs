//! Family record rules.

use crate::error::CoreError;
use crate::types::Timestamp;
use crate::validation::require_non_blank;

pub fn validate_family_name(name: &str) -> Result<(), CoreError> {
    require_non_blank(name, "Family name is required")
}

/// Pick the family head: the member created first. Ties keep the first
/// element seen. Works on any member shape via the `created_at` accessor.
pub fn family_head<T, F>(members: &[T], created_at: F) -> Option<&T>
where
    F: Fn(&T) -> Timestamp,
{
    members.iter().min_by_key(|m| created_at(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn head_is_earliest_created() {
        let now = Utc::now();
        let members = vec![
            ("b", now),
            ("a", now - Duration::days(3)),
            ("c", now - Duration::days(1)),
        ];
        let head = family_head(&members, |m| m.1).unwrap();
        assert_eq!(head.0, "a");
    }

    #[test]
    fn empty_family_has_no_head() {
        let members: Vec<(&str, Timestamp)> = Vec::new();
        assert!(family_head(&members, |m| m.1).is_none());
    }

    #[test]
    fn name_is_required() {
        assert!(validate_family_name("Smith").is_ok());
        assert!(validate_family_name("  ").is_err());
    }
}
