//! Member record rules: input normalization and the draft builder used by
//! create and update paths.

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::{Date, DbId};
use crate::validation::{is_valid_email, normalize_email, normalize_optional};

pub const FIRST_NAME_REQUIRED: &str = "First name cannot be blank";
pub const LAST_NAME_REQUIRED: &str = "Last name cannot be blank";
pub const EMAIL_REQUIRED: &str = "Valid email is required";
pub const EMAIL_EXISTS: &str = "Email already exists";

/// Join first and last name the way every listing displays them.
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

/// Raw member input as it arrives from a request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
    pub address: Option<String>,
    pub membership_date: Option<Date>,
    pub baptism_date: Option<Date>,
    pub is_active: Option<bool>,
    pub family_id: Option<DbId>,
    pub user_id: Option<DbId>,
}

/// A validated, normalized member ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
    pub address: Option<String>,
    pub membership_date: Date,
    pub baptism_date: Option<Date>,
    pub is_active: bool,
    pub family_id: Option<DbId>,
    pub user_id: Option<DbId>,
}

impl MemberDraft {
    pub fn builder() -> MemberDraftBuilder {
        MemberDraftBuilder::default()
    }

    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }

    /// Normalize and validate request input. `today` fills a missing
    /// membership date.
    pub fn from_input(input: MemberInput, today: Date) -> Result<Self, CoreError> {
        let mut builder = MemberDraft::builder()
            .first_name(input.first_name.as_deref().unwrap_or_default())
            .last_name(input.last_name.as_deref().unwrap_or_default())
            .email(input.email.as_deref().unwrap_or_default())
            .phone_number(input.phone_number.as_deref())
            .address(input.address.as_deref())
            .date_of_birth(input.date_of_birth)
            .baptism_date(input.baptism_date)
            .family_id(input.family_id)
            .user_id(input.user_id);
        if let Some(date) = input.membership_date {
            builder = builder.membership_date(date);
        }
        if let Some(active) = input.is_active {
            builder = builder.active(active);
        }
        builder.build(today)
    }
}

/// Fluent builder that normalizes as it goes.
#[derive(Debug, Clone, Default)]
pub struct MemberDraftBuilder {
    first_name: String,
    last_name: String,
    email: String,
    phone_number: Option<String>,
    date_of_birth: Option<Date>,
    address: Option<String>,
    membership_date: Option<Date>,
    baptism_date: Option<Date>,
    is_active: Option<bool>,
    family_id: Option<DbId>,
    user_id: Option<DbId>,
}

impl MemberDraftBuilder {
    pub fn first_name(mut self, value: &str) -> Self {
        self.first_name = value.trim().to_string();
        self
    }

    pub fn last_name(mut self, value: &str) -> Self {
        self.last_name = value.trim().to_string();
        self
    }

    pub fn email(mut self, value: &str) -> Self {
        self.email = normalize_email(value);
        self
    }

    pub fn phone_number(mut self, value: Option<&str>) -> Self {
        self.phone_number = normalize_optional(value);
        self
    }

    pub fn address(mut self, value: Option<&str>) -> Self {
        self.address = normalize_optional(value);
        self
    }

    pub fn date_of_birth(mut self, value: Option<Date>) -> Self {
        self.date_of_birth = value;
        self
    }

    pub fn membership_date(mut self, value: Date) -> Self {
        self.membership_date = Some(value);
        self
    }

    pub fn baptism_date(mut self, value: Option<Date>) -> Self {
        self.baptism_date = value;
        self
    }

    pub fn active(mut self, value: bool) -> Self {
        self.is_active = Some(value);
        self
    }

    pub fn family_id(mut self, value: Option<DbId>) -> Self {
        self.family_id = value;
        self
    }

    pub fn user_id(mut self, value: Option<DbId>) -> Self {
        self.user_id = value;
        self
    }

    /// Validate required fields and produce the draft.
    ///
    /// Fails on the first missing field in the order first name, last name,
    /// email. The email must also have a valid shape.
    pub fn build(self, today: Date) -> Result<MemberDraft, CoreError> {
        if self.first_name.is_empty() {
            return Err(CoreError::Validation(FIRST_NAME_REQUIRED.into()));
        }
        if self.last_name.is_empty() {
            return Err(CoreError::Validation(LAST_NAME_REQUIRED.into()));
        }
        if self.email.is_empty() || !is_valid_email(&self.email) {
            return Err(CoreError::Validation(EMAIL_REQUIRED.into()));
        }

        Ok(MemberDraft {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
            date_of_birth: self.date_of_birth,
            address: self.address,
            membership_date: self.membership_date.unwrap_or(today),
            baptism_date: self.baptism_date,
            is_active: self.is_active.unwrap_or(true),
            family_id: self.family_id,
            user_id: self.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn today() -> Date {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn builder_normalizes_fields() {
        let draft = MemberDraft::builder()
            .first_name("  John ")
            .last_name(" Doe")
            .email(" John.Doe@Example.COM ")
            .phone_number(Some("   "))
            .address(Some(" 1 Main St "))
            .build(today())
            .unwrap();

        assert_eq!(draft.first_name, "John");
        assert_eq!(draft.last_name, "Doe");
        assert_eq!(draft.email, "john.doe@example.com");
        assert_eq!(draft.phone_number, None);
        assert_eq!(draft.address.as_deref(), Some("1 Main St"));
        assert_eq!(draft.full_name(), "John Doe");
    }

    #[test]
    fn defaults_apply_when_unset() {
        let draft = MemberDraft::builder()
            .first_name("Jane")
            .last_name("Roe")
            .email("jane@example.org")
            .build(today())
            .unwrap();
        assert_eq!(draft.membership_date, today());
        assert!(draft.is_active);
    }

    #[test]
    fn missing_names_are_reported_in_order() {
        let err = MemberDraft::builder()
            .last_name("")
            .email("x@example.com")
            .build(today())
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg == FIRST_NAME_REQUIRED);

        let err = MemberDraft::builder()
            .first_name("A")
            .last_name("   ")
            .email("x@example.com")
            .build(today())
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg == LAST_NAME_REQUIRED);
    }

    #[test]
    fn invalid_email_is_rejected() {
        let err = MemberDraft::builder()
            .first_name("A")
            .last_name("B")
            .email("not-an-email")
            .build(today())
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg == EMAIL_REQUIRED);
    }

    #[test]
    fn from_input_keeps_explicit_values() {
        let input = MemberInput {
            first_name: Some("Ann".into()),
            last_name: Some("Lee".into()),
            email: Some("ann@example.com".into()),
            membership_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            is_active: Some(false),
            family_id: Some(7),
            ..Default::default()
        };
        let draft = MemberDraft::from_input(input, today()).unwrap();
        assert_eq!(draft.membership_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(!draft.is_active);
        assert_eq!(draft.family_id, Some(7));
    }
}
