use std::sync::Arc;

use church_db::procedures::DatabaseService;
use church_events::{AuditService, EmailService, EventBus, EventPublisher};

use crate::config::ServerConfig;
use crate::services::{AuthenticationService, DonationService, MemberService};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything inside is a pool handle, an `Arc` or a
/// service that holds only those.
#[derive(Clone)]
pub struct AppState {
    pub pool: church_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Bus the queue consumers listen on.
    pub event_bus: Arc<EventBus>,
    pub email: EmailService,
    pub audit: AuditService,
    pub procedures: DatabaseService,
    pub members: MemberService,
    pub donations: DonationService,
    pub auth: AuthenticationService,
}

impl AppState {
    /// Wire every service onto one pool and one bus.
    pub fn new(
        pool: church_db::DbPool,
        config: ServerConfig,
        event_bus: Arc<EventBus>,
        email: EmailService,
    ) -> Self {
        let events = EventPublisher::new(Arc::clone(&event_bus));
        let audit = AuditService::new(pool.clone());
        let auth = AuthenticationService::new(
            pool.clone(),
            config.jwt.clone(),
            audit.clone(),
            email.clone(),
        );

        AppState {
            members: MemberService::new(pool.clone(), events.clone()),
            donations: DonationService::new(pool.clone(), events),
            procedures: DatabaseService::new(pool.clone()),
            auth,
            audit,
            email,
            event_bus,
            config: Arc::new(config),
            pool,
        }
    }
}
