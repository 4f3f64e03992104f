//! Account rules: the user draft builder and registration checks.

use crate::error::CoreError;
use crate::roles::RoleType;
use crate::validation::{is_valid_email, normalize_email, require_min_length, require_non_blank};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

/// A new account before its password is hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: RoleType,
    pub enabled: bool,
}

impl UserDraft {
    pub fn builder() -> UserDraftBuilder {
        UserDraftBuilder::default()
    }

    /// Apply the registration rules on top of the required-field check.
    pub fn validate_registration(&self) -> Result<(), CoreError> {
        require_min_length(&self.username, MIN_USERNAME_LEN, "Username")?;
        if !is_valid_email(&self.email) {
            return Err(CoreError::Validation("Invalid email format".into()));
        }
        require_min_length(&self.password, MIN_PASSWORD_LEN, "Password")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserDraftBuilder {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<RoleType>,
    enabled: Option<bool>,
}

impl UserDraftBuilder {
    pub fn username(mut self, value: &str) -> Self {
        self.username = Some(value.trim().to_string());
        self
    }

    pub fn email(mut self, value: &str) -> Self {
        self.email = Some(normalize_email(value));
        self
    }

    /// Passwords are kept as given; whitespace is significant.
    pub fn password(mut self, value: &str) -> Self {
        self.password = Some(value.to_string());
        self
    }

    pub fn role(mut self, value: RoleType) -> Self {
        self.role = Some(value);
        self
    }

    pub fn enabled(mut self, value: bool) -> Self {
        self.enabled = Some(value);
        self
    }

    /// Build the draft, listing every missing required field in one error.
    pub fn build(self) -> Result<UserDraft, CoreError> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        let mut missing = Vec::new();
        if !present(&self.username) {
            missing.push("username");
        }
        if !present(&self.password) {
            missing.push("password");
        }
        if !present(&self.email) {
            missing.push("email");
        }
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        Ok(UserDraft {
            username: self.username.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
        })
    }
}

/// Reject a blank username or password before any lookup happens.
pub fn validate_login(username: &str, password: &str) -> Result<(), CoreError> {
    require_non_blank(username, "Username cannot be blank")?;
    require_non_blank(password, "Password cannot be blank")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn reports_all_missing_fields() {
        let err = UserDraft::builder().build().unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation(msg) if msg == "Missing required fields: username, password, email"
        );
    }

    #[test]
    fn reports_only_missing_fields() {
        let err = UserDraft::builder().username("bob").password("  ").build().unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation(msg) if msg == "Missing required fields: password, email"
        );
    }

    #[test]
    fn builds_with_defaults() {
        let draft = UserDraft::builder()
            .username("  bob ")
            .email("Bob@Example.com")
            .password("secret1")
            .build()
            .unwrap();
        assert_eq!(draft.username, "bob");
        assert_eq!(draft.email, "bob@example.com");
        assert_eq!(draft.role, RoleType::Member);
        assert!(draft.enabled);
    }

    #[test]
    fn registration_rules() {
        let base = UserDraft::builder()
            .username("bob")
            .email("bob@example.com")
            .password("secret1")
            .build()
            .unwrap();
        assert!(base.validate_registration().is_ok());

        let short_name = UserDraft { username: "bo".into(), ..base.clone() };
        assert_matches!(
            short_name.validate_registration(),
            Err(CoreError::Validation(msg)) if msg == "Username must be at least 3 characters"
        );

        let bad_email = UserDraft { email: "bob".into(), ..base.clone() };
        assert_matches!(
            bad_email.validate_registration(),
            Err(CoreError::Validation(msg)) if msg == "Invalid email format"
        );

        let short_pw = UserDraft { password: "12345".into(), ..base };
        assert_matches!(
            short_pw.validate_registration(),
            Err(CoreError::Validation(msg)) if msg == "Password must be at least 6 characters"
        );
    }

    #[test]
    fn login_requires_both_fields() {
        assert!(validate_login("bob", "pw").is_ok());
        assert_matches!(validate_login(" ", "pw"), Err(CoreError::Validation(_)));
        assert_matches!(validate_login("bob", ""), Err(CoreError::Validation(_)));
    }
}
