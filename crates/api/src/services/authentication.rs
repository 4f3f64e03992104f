//! Login, registration, token issue/rotation and password reset.
//!
//! Every login attempt is written to the audit trail. Audit failures are
//! traced and never block the login itself.

use chrono::{Duration, Utc};
use church_core::error::CoreError;
use church_core::roles::RoleType;
use church_core::types::DbId;
use church_core::user::{validate_login, UserDraft, MIN_PASSWORD_LEN};
use church_core::validation::require_min_length;
use church_db::models::session::{CreatePasswordReset, CreateSession};
use church_db::models::user::{CreateUser, User, UserInfo};
use church_db::repositories::{PasswordResetRepo, SessionRepo, UserRepo};
use church_db::DbPool;
use church_events::{AuditService, EmailService};
use serde::Serialize;

use super::db_error;
use crate::auth::jwt::{generate_access_token, generate_opaque_token, hash_token, validate_token, JwtConfig};
use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::error::unique_constraint;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Reset links stay valid for one hour.
const RESET_TOKEN_TTL_MINS: i64 = 60;

/// Tokens handed out by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Clone)]
pub struct AuthenticationService {
    pool: DbPool,
    jwt: JwtConfig,
    audit: AuditService,
    email: EmailService,
}

impl AuthenticationService {
    pub fn new(pool: DbPool, jwt: JwtConfig, audit: AuditService, email: EmailService) -> Self {
        Self {
            pool,
            jwt,
            audit,
            email,
        }
    }

    /// Check a username/password pair. Unknown users and wrong passwords
    /// get the same answer.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, CoreError> {
        validate_login(username, password)?;
        let username = username.trim();

        let Some(user) = UserRepo::find_by_username(&self.pool, username)
            .await
            .map_err(db_error)?
        else {
            verify_dummy(password);
            self.audit_login(username, false, None).await;
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        let valid = verify_password(password, &user.password_hash)
            .map_err(|e| CoreError::Internal(format!("Password verification error: {e}")))?;
        if !valid {
            self.audit_login(username, false, Some(user.id)).await;
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        if !user.enabled {
            self.audit_login(username, false, Some(user.id)).await;
            return Err(CoreError::Forbidden("Account is disabled".into()));
        }

        self.audit_login(username, true, Some(user.id)).await;
        Ok(user)
    }

    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: RoleType,
    ) -> Result<User, CoreError> {
        let draft = UserDraft::builder()
            .username(username)
            .email(email)
            .password(password.trim())
            .role(role)
            .build()?;
        draft.validate_registration()?;

        if UserRepo::exists_by_username(&self.pool, &draft.username)
            .await
            .map_err(db_error)?
        {
            return Err(CoreError::Conflict("Username already exists".into()));
        }
        if UserRepo::exists_by_email(&self.pool, &draft.email)
            .await
            .map_err(db_error)?
        {
            return Err(CoreError::Conflict("Email already exists".into()));
        }

        let password_hash = hash_password(&draft.password)
            .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))?;
        let input = CreateUser {
            username: draft.username,
            email: draft.email,
            password_hash,
            role: draft.role,
        };

        let user = UserRepo::create(&self.pool, &input).await.map_err(|e| {
            if unique_constraint(&e).is_some() {
                tracing::warn!(username = %input.username, "Unique constraint violation registering user");
                CoreError::Conflict("Username or email already exists".into())
            } else {
                db_error(e)
            }
        })?;
        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Issue an access token plus a fresh refresh-token session.
    pub async fn generate_token(&self, user: &User) -> Result<AuthTokens, CoreError> {
        let role = user.role_type()?;
        let access_token = generate_access_token(user.id, &user.username, role, &self.jwt)
            .map_err(|e| CoreError::Internal(format!("Token generation failed: {e}")))?;

        let (refresh_token, refresh_hash) = generate_opaque_token();
        SessionRepo::create(
            &self.pool,
            &CreateSession {
                user_id: user.id,
                refresh_token_hash: refresh_hash,
                expires_at: Utc::now() + Duration::days(self.jwt.refresh_token_expiry_days),
            },
        )
        .await
        .map_err(db_error)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.jwt.access_token_expiry_secs(),
            user: UserInfo::from(user),
        })
    }

    /// Resolve the user behind an access token.
    pub async fn get_user_from_token(&self, token: &str) -> Result<User, CoreError> {
        let claims = validate_token(token, &self.jwt)
            .map_err(|_| CoreError::Unauthorized("Invalid or expired token".into()))?;
        self.find_user(claims.sub).await
    }

    pub async fn find_user(&self, id: DbId) -> Result<User, CoreError> {
        UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .ok_or(CoreError::NotFound { entity: "User", id })
    }

    /// Exchange a refresh token for new tokens. The old session is revoked.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, CoreError> {
        let session = SessionRepo::redeem(&self.pool, &hash_token(refresh_token))
            .await
            .map_err(db_error)?
            .ok_or_else(|| CoreError::Unauthorized("Invalid or expired refresh token".into()))?;

        let user = UserRepo::find_by_id(&self.pool, session.user_id)
            .await
            .map_err(db_error)?
            .ok_or_else(|| CoreError::Unauthorized("User no longer exists".into()))?;
        if !user.enabled {
            return Err(CoreError::Forbidden("Account is disabled".into()));
        }

        self.generate_token(&user).await
    }

    /// Revoke every refresh session of the user.
    pub async fn logout(&self, user_id: DbId) -> Result<(), CoreError> {
        let revoked = SessionRepo::revoke_all_for_user(&self.pool, user_id)
            .await
            .map_err(db_error)?;
        tracing::info!(user_id, revoked, "User logged out");
        Ok(())
    }

    /// Email a single-use reset link. Unknown addresses succeed silently.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), CoreError> {
        let email = email.trim().to_lowercase();
        let Some(user) = UserRepo::find_by_email(&self.pool, &email)
            .await
            .map_err(db_error)?
        else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(());
        };

        let (token, token_hash) = generate_opaque_token();
        PasswordResetRepo::create(
            &self.pool,
            &CreatePasswordReset {
                user_id: user.id,
                token_hash,
                expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINS),
            },
        )
        .await
        .map_err(db_error)?;

        self.email
            .send_password_reset_email(&user.email, &token)
            .await
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        tracing::info!(user_id = user.id, "Password reset email sent");
        Ok(())
    }

    /// Set a new password with a reset token, then end all sessions.
    pub async fn confirm_password_reset(&self, token: &str, new_password: &str) -> Result<(), CoreError> {
        require_min_length(new_password.trim(), MIN_PASSWORD_LEN, "Password")?;

        let reset = PasswordResetRepo::consume(&self.pool, &hash_token(token))
            .await
            .map_err(db_error)?
            .ok_or_else(|| CoreError::Validation("Invalid or expired reset token".into()))?;

        let password_hash = hash_password(new_password.trim())
            .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))?;
        UserRepo::update_password(&self.pool, reset.user_id, &password_hash)
            .await
            .map_err(db_error)?;
        SessionRepo::revoke_all_for_user(&self.pool, reset.user_id)
            .await
            .map_err(db_error)?;

        tracing::info!(user_id = reset.user_id, "Password reset completed");
        Ok(())
    }

    async fn audit_login(&self, username: &str, success: bool, user_id: Option<DbId>) {
        if let Err(e) = self.audit.log_user_authentication(username, success, user_id).await {
            tracing::warn!(error = %e, "Failed to audit authentication");
        }
    }
}
