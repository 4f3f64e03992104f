//! Audit trail constants and helpers.
//!
//! Lives in `core` so the repository layer, the event consumers and the
//! HTTP handlers agree on action names and redaction rules.

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Known actions recorded in `audit_logs.action`.
pub mod actions {
    pub const MEMBER_CREATED: &str = "MEMBER_CREATED";
    pub const DONATION_CREATED: &str = "DONATION_CREATED";
    pub const EMAIL_SENT: &str = "EMAIL_SENT";
    pub const ERROR_OCCURRED: &str = "ERROR_OCCURRED";
    pub const USER_AUTHENTICATION: &str = "USER_AUTHENTICATION";

    pub const ALL: &[&str] = &[
        MEMBER_CREATED,
        DONATION_CREATED,
        EMAIL_SENT,
        ERROR_OCCURRED,
        USER_AUTHENTICATION,
    ];
}

/// Check whether `action` is one of the recorded action names.
pub fn is_known_action(action: &str) -> bool {
    actions::ALL.contains(&action)
}

/// Summary string stored for an authentication attempt.
pub fn authentication_summary(username: &str, success: bool) -> String {
    format!("Username: {username}, Success: {success}")
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Key fragments whose values never reach the audit table.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "authorization",
    "credential",
];

/// Redact sensitive fields from a JSON value, recursing into objects and
/// arrays. Matching is a case-insensitive substring test on the key.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let redacted = map
                .iter()
                .map(|(key, val)| {
                    let lower = key.to_lowercase();
                    let val = if SENSITIVE_FIELDS.iter().any(|f| lower.contains(f)) {
                        serde_json::Value::String("[REDACTED]".to_string())
                    } else {
                        redact_sensitive_fields(val)
                    };
                    (key.clone(), val)
                })
                .collect();
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_actions() {
        assert!(is_known_action(actions::EMAIL_SENT));
        assert!(!is_known_action("login"));
    }

    #[test]
    fn authentication_summary_format() {
        assert_eq!(
            authentication_summary("bob", false),
            "Username: bob, Success: false"
        );
    }

    #[test]
    fn redacts_nested_secrets() {
        let input = json!({
            "username": "bob",
            "Password": "hunter2",
            "session": { "refresh_token": "abc", "user_id": 4 },
            "items": [{ "api_secret": "x" }],
        });
        let out = redact_sensitive_fields(&input);
        assert_eq!(out["username"], "bob");
        assert_eq!(out["Password"], "[REDACTED]");
        assert_eq!(out["session"]["refresh_token"], "[REDACTED]");
        assert_eq!(out["session"]["user_id"], 4);
        assert_eq!(out["items"][0]["api_secret"], "[REDACTED]");
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(redact_sensitive_fields(&json!(42)), json!(42));
    }
}
