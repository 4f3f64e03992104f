use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use church_core::error::CoreError;
use church_db::procedures::ProcedureError;
use church_events::EmailError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Every variant renders as `{"error": message, "code": CODE}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A lookup by something other than the primary key found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(entity: &'static str, id: church_core::types::DbId) -> Self {
        AppError::Core(CoreError::NotFound { entity, id })
    }
}

/// Dispatcher input problems are the caller's fault; database failures
/// keep their usual mapping.
impl From<ProcedureError> for AppError {
    fn from(err: ProcedureError) -> Self {
        match err {
            ProcedureError::Database(e) => AppError::Database(e),
            other => AppError::Core(CoreError::Validation(other.to_string())),
        }
    }
}

/// Rejected input is a 400. A batch failure is also a 400 so the caller
/// sees which messages failed; a single transport failure stays internal.
impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::InvalidRecipient(_)
            | EmailError::InvalidSubject(_)
            | EmailError::InvalidBody(_) => AppError::Core(CoreError::Validation(err.to_string())),
            EmailError::BulkSendingFailed(_) => AppError::BadRequest(err.to_string()),
            EmailError::SendingFailed(_) => AppError::InternalError(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} not found with id: {id}"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map a sqlx error to status, code and message.
///
/// `RowNotFound` is a 404, a unique violation on a `uq_*` constraint is a
/// 409, and everything else is a sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            if let Some(constraint) = unique_violation(db_err.as_ref()) {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

/// The `uq_*` constraint name when `err` is a PostgreSQL unique violation.
pub fn unique_violation(err: &dyn sqlx::error::DatabaseError) -> Option<&str> {
    if err.code().as_deref() != Some("23505") {
        return None;
    }
    err.constraint().filter(|c| c.starts_with("uq_"))
}

/// Unwrap a unique-violation constraint name from any sqlx error.
pub fn unique_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => unique_violation(db_err.as_ref()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn core_errors_map_to_status_and_code() {
        let cases = [
            (CoreError::NotFound { entity: "Member", id: 7 }, StatusCode::NOT_FOUND, "NOT_FOUND"),
            (CoreError::Validation("bad".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (CoreError::Conflict("dup".into()), StatusCode::CONFLICT, "CONFLICT"),
            (CoreError::Unauthorized("who".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (CoreError::Forbidden("no".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (CoreError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            let (got_status, body) = render(err.into()).await;
            assert_eq!(got_status, status);
            assert_eq!(body["code"], code);
        }
    }

    #[tokio::test]
    async fn not_found_names_the_entity() {
        let (_, body) = render(AppError::not_found("Member", 7)).await;
        assert_eq!(body["error"], "Member not found with id: 7");
    }

    #[tokio::test]
    async fn internal_messages_are_sanitized() {
        let (_, body) = render(AppError::InternalError("secret detail".into())).await;
        assert_eq!(body["error"], "An internal error occurred");
    }

    #[tokio::test]
    async fn row_not_found_is_404() {
        let (status, _) = render(sqlx::Error::RowNotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn procedure_errors_are_client_errors() {
        let (status, body) = render(ProcedureError::UnknownProcedure("drop_all".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown procedure: drop_all");

        let (status, _) = render(ProcedureError::MissingName.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
