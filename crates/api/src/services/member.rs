//! Member lifecycle: validated create and update, soft delete, lookups.

use chrono::Utc;
use church_core::error::CoreError;
use church_core::member::{MemberDraft, MemberInput, EMAIL_EXISTS};
use church_core::types::{Date, DbId};
use church_db::models::member::Member;
use church_db::repositories::{FamilyRepo, MemberRepo, UserRepo};
use church_db::DbPool;
use church_events::EventPublisher;

use super::db_error;
use crate::error::unique_constraint;

const USER_ALREADY_LINKED: &str = "User is already linked to another member";

#[derive(Clone)]
pub struct MemberService {
    pool: DbPool,
    events: EventPublisher,
}

impl MemberService {
    pub fn new(pool: DbPool, events: EventPublisher) -> Self {
        Self { pool, events }
    }

    pub async fn find_by_id(&self, id: DbId) -> Result<Member, CoreError> {
        MemberRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .ok_or(CoreError::NotFound { entity: "Member", id })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Member>, CoreError> {
        let email = email.trim().to_lowercase();
        MemberRepo::find_by_email(&self.pool, &email).await.map_err(db_error)
    }

    /// Validate, insert and publish `member.created`.
    pub async fn create(&self, input: MemberInput, actor: Option<DbId>) -> Result<Member, CoreError> {
        let draft = MemberDraft::from_input(input, today())?;

        if MemberRepo::exists_by_email(&self.pool, &draft.email)
            .await
            .map_err(db_error)?
        {
            return Err(CoreError::Validation(EMAIL_EXISTS.into()));
        }
        self.ensure_links(&draft).await?;

        let member = MemberRepo::create(&self.pool, &draft)
            .await
            .map_err(unique_or_db)?;
        tracing::info!(member_id = member.id, "Member created");

        self.events.member_created(&member, actor);
        Ok(member)
    }

    /// The family and user a member points at must exist.
    async fn ensure_links(&self, draft: &MemberDraft) -> Result<(), CoreError> {
        if let Some(family_id) = draft.family_id {
            FamilyRepo::find_by_id(&self.pool, family_id)
                .await
                .map_err(db_error)?
                .ok_or(CoreError::NotFound { entity: "Family", id: family_id })?;
        }
        if let Some(user_id) = draft.user_id {
            UserRepo::find_by_id(&self.pool, user_id)
                .await
                .map_err(db_error)?
                .ok_or(CoreError::NotFound { entity: "User", id: user_id })?;
        }
        Ok(())
    }

    pub async fn list_active(&self) -> Result<Vec<Member>, CoreError> {
        MemberRepo::list_active(&self.pool).await.map_err(db_error)
    }

    /// Replace every field of an existing member. A missing membership
    /// date or active flag keeps the stored value.
    pub async fn update(&self, id: DbId, mut input: MemberInput) -> Result<Member, CoreError> {
        let existing = self.find_by_id(id).await?;
        input.membership_date = input.membership_date.or(Some(existing.membership_date));
        input.is_active = input.is_active.or(Some(existing.is_active));
        let draft = MemberDraft::from_input(input, today())?;

        if let Some(other) = MemberRepo::find_by_email(&self.pool, &draft.email)
            .await
            .map_err(db_error)?
        {
            if other.id != id {
                return Err(CoreError::Validation(EMAIL_EXISTS.into()));
            }
        }
        self.ensure_links(&draft).await?;

        let member = MemberRepo::update(&self.pool, id, &draft)
            .await
            .map_err(unique_or_db)?
            .ok_or(CoreError::NotFound { entity: "Member", id })?;
        tracing::info!(member_id = id, "Member updated");
        Ok(member)
    }

    /// Soft delete: the row stays with `is_active = false`.
    pub async fn deactivate(&self, id: DbId) -> Result<Member, CoreError> {
        let member = MemberRepo::deactivate(&self.pool, id)
            .await
            .map_err(db_error)?
            .ok_or(CoreError::NotFound { entity: "Member", id })?;
        tracing::info!(member_id = id, "Member deactivated");
        Ok(member)
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Member>, CoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(CoreError::Validation("Search term is required".into()));
        }
        MemberRepo::search(&self.pool, term).await.map_err(db_error)
    }

    pub async fn list_by_family(&self, family_id: DbId) -> Result<Vec<Member>, CoreError> {
        MemberRepo::list_by_family(&self.pool, family_id)
            .await
            .map_err(db_error)
    }

    pub async fn list_by_membership_range(&self, start: Date, end: Date) -> Result<Vec<Member>, CoreError> {
        if end < start {
            return Err(CoreError::Validation(
                "End date cannot be before start date".into(),
            ));
        }
        MemberRepo::list_by_membership_date_range(&self.pool, start, end)
            .await
            .map_err(db_error)
    }
}

fn today() -> Date {
    Utc::now().date_naive()
}

/// Two requests can pass the existence checks together; the unique
/// indexes decide.
fn unique_or_db(err: sqlx::Error) -> CoreError {
    match unique_constraint(&err) {
        Some("uq_members_email") => CoreError::Validation(EMAIL_EXISTS.into()),
        Some("uq_members_user_id") => CoreError::Conflict(USER_ALREADY_LINKED.into()),
        _ => db_error(err),
    }
}
