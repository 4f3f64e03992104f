//! Consumers for the four queues, and the table that wires them up.

use std::sync::Arc;

use async_trait::async_trait;

use crate::audit::AuditService;
use crate::bus::ChurchEvent;
use crate::email::{EmailRequest, EmailService};
use crate::routes::{Queue, QueueConsumer, RouteError, RouteTable};

/// `member.created` → audit.
pub struct MemberCreatedConsumer {
    audit: AuditService,
}

#[async_trait]
impl QueueConsumer for MemberCreatedConsumer {
    async fn handle(&self, event: &ChurchEvent) -> Result<(), RouteError> {
        self.audit.log_member_created(&event.payload).await?;
        Ok(())
    }
}

/// `donation.created` → audit.
pub struct DonationCreatedConsumer {
    audit: AuditService,
}

#[async_trait]
impl QueueConsumer for DonationCreatedConsumer {
    async fn handle(&self, event: &ChurchEvent) -> Result<(), RouteError> {
        self.audit.log_donation_created(&event.payload).await?;
        Ok(())
    }
}

/// `email.notification` → send, then audit the delivery.
pub struct EmailNotificationConsumer {
    email: EmailService,
    audit: AuditService,
}

#[async_trait]
impl QueueConsumer for EmailNotificationConsumer {
    async fn handle(&self, event: &ChurchEvent) -> Result<(), RouteError> {
        let request: EmailRequest = serde_json::from_value(event.payload.clone())?;
        let result = self.email.send(&request).await?;
        self.audit
            .log_email_sent(&serde_json::to_value(&result)?)
            .await?;
        Ok(())
    }
}

/// `error` → audit with `success = false`.
pub struct ErrorConsumer {
    audit: AuditService,
}

#[async_trait]
impl QueueConsumer for ErrorConsumer {
    async fn handle(&self, event: &ChurchEvent) -> Result<(), RouteError> {
        self.audit.log_error(&event.payload).await?;
        Ok(())
    }
}

/// The standard table: one consumer per queue.
pub fn default_routes(audit: AuditService, email: EmailService) -> Result<RouteTable, RouteError> {
    let mut table = RouteTable::new();
    table.register(
        Queue::MemberCreated,
        Arc::new(MemberCreatedConsumer {
            audit: audit.clone(),
        }),
    )?;
    table.register(
        Queue::DonationCreated,
        Arc::new(DonationCreatedConsumer {
            audit: audit.clone(),
        }),
    )?;
    table.register(
        Queue::EmailNotification,
        Arc::new(EmailNotificationConsumer {
            email,
            audit: audit.clone(),
        }),
    )?;
    table.register(Queue::Error, Arc::new(ErrorConsumer { audit }))?;
    Ok(table)
}
