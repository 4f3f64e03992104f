//! Audit trail writer.
//!
//! Every method traces the action at the appropriate level, redacts
//! sensitive fields and appends a row to `audit_logs`.

use chrono::{DateTime, Utc};
use church_core::audit::{actions, authentication_summary, redact_sensitive_fields};
use church_core::types::DbId;
use church_db::models::audit::CreateAuditLog;
use church_db::repositories::AuditLogRepo;
use church_db::DbPool;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Logging failed: {0}")]
    LoggingFailed(String),
}

/// What was recorded.
#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    pub action: String,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}

#[derive(Clone)]
pub struct AuditService {
    pool: DbPool,
}

impl AuditService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// `data` is the created member as JSON.
    pub async fn log_member_created(&self, data: &Value) -> Result<AuditResult, AuditError> {
        tracing::info!(member_id = ?entity_id(data), "Member created");
        self.record(actions::MEMBER_CREATED, Some("member"), data, true, None)
            .await
            .map_err(|e| failed("member creation", e))
    }

    /// `data` is the created donation as JSON.
    pub async fn log_donation_created(&self, data: &Value) -> Result<AuditResult, AuditError> {
        tracing::info!(donation_id = ?entity_id(data), "Donation created");
        self.record(actions::DONATION_CREATED, Some("donation"), data, true, None)
            .await
            .map_err(|e| failed("donation creation", e))
    }

    pub async fn log_email_sent(&self, data: &Value) -> Result<AuditResult, AuditError> {
        tracing::info!(to = ?data.get("to"), subject = ?data.get("subject"), "Email sent");
        self.record(actions::EMAIL_SENT, None, data, true, None)
            .await
            .map_err(|e| failed("email sending", e))
    }

    /// Recorded with `success = false`.
    pub async fn log_error(&self, data: &Value) -> Result<AuditResult, AuditError> {
        tracing::error!(error = %data, "Error occurred");
        self.record(actions::ERROR_OCCURRED, None, data, false, None)
            .await
            .map_err(|e| failed("error", e))
    }

    pub async fn log_user_authentication(
        &self,
        username: &str,
        success: bool,
        user_id: Option<DbId>,
    ) -> Result<AuditResult, AuditError> {
        if success {
            tracing::info!(username, success, "User authentication");
        } else {
            tracing::warn!(username, success, "User authentication");
        }

        let data = json!({ "summary": authentication_summary(username, success) });
        self.record(actions::USER_AUTHENTICATION, Some("user"), &data, success, user_id)
            .await
            .map_err(|e| failed("authentication", e))
    }

    async fn record(
        &self,
        action: &str,
        entity_type: Option<&str>,
        data: &Value,
        success: bool,
        user_id: Option<DbId>,
    ) -> Result<AuditResult, sqlx::Error> {
        let data = redact_sensitive_fields(data);
        let entry = CreateAuditLog {
            action: action.to_string(),
            data: Some(data.clone()),
            success,
            user_id,
            entity_type: entity_type.map(str::to_string),
            entity_id: entity_type.and_then(|_| entity_id(&data)),
        };
        let row = AuditLogRepo::insert(&self.pool, &entry).await?;

        Ok(AuditResult {
            action: row.action,
            data,
            timestamp: row.created_at,
            success: row.success,
        })
    }
}

fn entity_id(data: &Value) -> Option<DbId> {
    data.get("id").and_then(Value::as_i64)
}

fn failed(what: &str, err: sqlx::Error) -> AuditError {
    tracing::error!(error = %err, "Error logging {what}");
    AuditError::LoggingFailed(format!("Failed to log {what}: {err}"))
}
