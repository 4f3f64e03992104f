//! Outbound email: validation, templates and pluggable transports.
//!
//! [`EmailService`] validates every message before it reaches a transport.
//! The transport is chosen at startup: [`SmtpTransport`] (lettre) when
//! `SMTP_HOST` is configured, otherwise [`LogTransport`], which only traces
//! the message.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use church_core::validation::is_valid_email;
use church_db::models::member::Member;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmailError {
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Invalid subject: {0}")]
    InvalidSubject(String),

    #[error("Invalid body: {0}")]
    InvalidBody(String),

    #[error("Email sending failed: {0}")]
    SendingFailed(String),

    #[error("Bulk sending failed: {}", .0.join(", "))]
    BulkSendingFailed(Vec<String>),
}

impl From<lettre::transport::smtp::Error> for EmailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        EmailError::SendingFailed(err.to_string())
    }
}

impl From<lettre::address::AddressError> for EmailError {
    fn from(err: lettre::address::AddressError) -> Self {
        EmailError::InvalidRecipient(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A message to send. Also the payload of the `email.notification` queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailRequest {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailResult {
    pub to: String,
    pub subject: String,
    pub sent: bool,
    pub timestamp: DateTime<Utc>,
}

/// Reject blank fields and malformed recipients, in that order.
pub fn validate_request(request: &EmailRequest) -> Result<(), EmailError> {
    if request.to.trim().is_empty() {
        return Err(EmailError::InvalidRecipient(
            "Email address cannot be blank".into(),
        ));
    }
    if request.subject.trim().is_empty() {
        return Err(EmailError::InvalidSubject("Subject cannot be blank".into()));
    }
    if request.body.trim().is_empty() {
        return Err(EmailError::InvalidBody("Email body cannot be blank".into()));
    }
    if !is_valid_email(&request.to) {
        return Err(EmailError::InvalidRecipient(format!(
            "Invalid email format: {}",
            request.to
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

pub const WELCOME_SUBJECT: &str = "Welcome to Our Church Community!";
pub const THANK_YOU_SUBJECT: &str = "Thank You for Your Generous Donation";
pub const PASSWORD_RESET_SUBJECT: &str = "Password Reset Request";

pub fn welcome_email(member: &Member) -> EmailRequest {
    let body = format!(
        "Dear {},\n\n\
         Welcome to our church community! We're thrilled to have you as part of our family.\n\n\
         Your membership was registered on {}.\n\n\
         We look forward to seeing you at our services and events.\n\n\
         Blessings,\n\
         The Church Team",
        member.full_name(),
        member.membership_date,
    );
    EmailRequest::new(&member.email, WELCOME_SUBJECT, body)
}

pub fn donation_thank_you_email(member: &Member, amount: &str) -> EmailRequest {
    let body = format!(
        "Dear {},\n\n\
         Thank you for your generous donation of {amount}. Your contribution helps us continue \
         our mission and serve our community.\n\n\
         May God bless you for your generosity.\n\n\
         With gratitude,\n\
         The Church Team",
        member.full_name(),
    );
    EmailRequest::new(&member.email, THANK_YOU_SUBJECT, body)
}

/// Reset link with the token URL-encoded into the query string.
pub fn password_reset_link(public_base_url: &str, token: &str) -> String {
    format!(
        "{}/reset?token={}",
        public_base_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

pub fn password_reset_email(email: &str, public_base_url: &str, token: &str) -> EmailRequest {
    let body = format!(
        "Click here to reset your password: {}",
        password_reset_link(public_base_url, token)
    );
    EmailRequest::new(email, PASSWORD_RESET_SUBJECT, body)
}

// ---------------------------------------------------------------------------
// Transports
// ---------------------------------------------------------------------------

/// Delivers an already-validated message.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn deliver(&self, request: &EmailRequest) -> Result<(), EmailError>;
}

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@church.local";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load SMTP settings from the environment.
    ///
    /// Returns `None` when `SMTP_HOST` is unset.
    ///
    /// | Variable        | Required | Default                 |
    /// |-----------------|----------|-------------------------|
    /// | `SMTP_HOST`     | yes      |                         |
    /// | `SMTP_PORT`     | no       | `587`                   |
    /// | `SMTP_FROM`     | no       | `noreply@church.local`  |
    /// | `SMTP_USER`     | no       |                         |
    /// | `SMTP_PASSWORD` | no       |                         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Sends plain-text mail through an SMTP relay.
pub struct SmtpTransport {
    config: EmailConfig,
}

impl SmtpTransport {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    async fn deliver(&self, request: &EmailRequest) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(request.to.parse()?)
            .subject(request.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(request.body.clone())
            .map_err(|e| EmailError::SendingFailed(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        transport_builder.build().send(email).await?;
        Ok(())
    }
}

/// Development transport: traces the message and reports success.
pub struct LogTransport;

#[async_trait]
impl EmailTransport for LogTransport {
    async fn deliver(&self, request: &EmailRequest) -> Result<(), EmailError> {
        tracing::info!(
            to = %request.to,
            subject = %request.subject,
            body_len = request.body.len(),
            "Email delivery skipped (no SMTP configured)"
        );
        Ok(())
    }
}

/// Keeps delivered messages in memory. Used by tests to observe what the
/// routing layer sends.
#[derive(Default, Clone)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<EmailRequest>>>,
}

impl MemoryTransport {
    pub fn sent(&self) -> Vec<EmailRequest> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailTransport for MemoryTransport {
    async fn deliver(&self, request: &EmailRequest) -> Result<(), EmailError> {
        self.sent
            .lock()
            .map_err(|e| EmailError::SendingFailed(e.to_string()))?
            .push(request.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EmailService
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct EmailService {
    transport: Arc<dyn EmailTransport>,
    public_base_url: String,
}

impl EmailService {
    pub fn new(transport: Arc<dyn EmailTransport>, public_base_url: impl Into<String>) -> Self {
        Self {
            transport,
            public_base_url: public_base_url.into(),
        }
    }

    /// SMTP when configured, otherwise the log-only transport.
    pub fn from_config(config: Option<EmailConfig>, public_base_url: impl Into<String>) -> Self {
        let transport: Arc<dyn EmailTransport> = match config {
            Some(config) => {
                tracing::info!(host = %config.smtp_host, "SMTP email transport configured");
                Arc::new(SmtpTransport::new(config))
            }
            None => {
                tracing::info!("SMTP_HOST not set, emails will only be logged");
                Arc::new(LogTransport)
            }
        };
        Self::new(transport, public_base_url)
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    /// Validate and deliver a single message.
    pub async fn send(&self, request: &EmailRequest) -> Result<EmailResult, EmailError> {
        validate_request(request)?;
        tracing::info!(to = %request.to, subject = %request.subject, "Sending email");

        if let Err(e) = self.transport.deliver(request).await {
            tracing::error!(to = %request.to, error = %e, "Error sending email");
            return Err(match e {
                EmailError::SendingFailed(_) => e,
                other => EmailError::SendingFailed(other.to_string()),
            });
        }

        Ok(EmailResult {
            to: request.to.clone(),
            subject: request.subject.clone(),
            sent: true,
            timestamp: Utc::now(),
        })
    }

    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<EmailResult, EmailError> {
        self.send(&EmailRequest::new(to, subject, body)).await
    }

    pub async fn send_welcome_email(&self, member: &Member) -> Result<EmailResult, EmailError> {
        self.send(&welcome_email(member)).await
    }

    pub async fn send_donation_thank_you(
        &self,
        member: &Member,
        amount: &str,
    ) -> Result<EmailResult, EmailError> {
        self.send(&donation_thank_you_email(member, amount)).await
    }

    pub async fn send_password_reset_email(
        &self,
        email: &str,
        token: &str,
    ) -> Result<EmailResult, EmailError> {
        self.send(&password_reset_email(email, &self.public_base_url, token))
            .await
    }

    /// Send every request concurrently. Any failure fails the batch with a
    /// list of every individual failure message.
    pub async fn send_bulk_emails(
        &self,
        requests: &[EmailRequest],
    ) -> Result<Vec<EmailResult>, EmailError> {
        let outcomes = futures::future::join_all(requests.iter().map(|r| self.send(r))).await;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => failures.push(e.to_string()),
            }
        }

        if failures.is_empty() {
            Ok(results)
        } else {
            tracing::warn!(failed = failures.len(), total = requests.len(), "Bulk email had failures");
            Err(EmailError::BulkSendingFailed(failures))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
