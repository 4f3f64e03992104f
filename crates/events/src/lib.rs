//! Church event routing, audit trail and email notification.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`EventPublisher`]: the direct routes services call after a write.
//! - [`RouteTable`]: one consumer per queue, run as background loops.
//! - [`AuditService`] and [`EmailService`]: what the consumers call.

pub mod audit;
pub mod bus;
pub mod consumers;
pub mod email;
pub mod publisher;
pub mod routes;

use std::sync::Arc;

pub use audit::{AuditError, AuditResult, AuditService};
pub use bus::{ChurchEvent, EventBus};
pub use email::{EmailConfig, EmailError, EmailRequest, EmailResult, EmailService};
pub use publisher::EventPublisher;
pub use routes::{Queue, QueueConsumer, RouteError, RouteHandles, RouteTable};

/// Register the standard consumers on `bus` and start their loops.
pub fn start_routes(
    bus: Arc<EventBus>,
    audit: AuditService,
    email: EmailService,
) -> Result<RouteHandles, RouteError> {
    let table = consumers::default_routes(audit, email)?;
    Ok(table.start(bus))
}
