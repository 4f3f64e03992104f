//! Direct routes: the entry points services call after a write commits.
//!
//! `member_created` and `donation_created` marshal the record onto its
//! queue and then forward a templated email to `email.notification`.
//! Anything that cannot be marshalled goes to the error queue instead.

use std::sync::Arc;

use church_core::types::DbId;
use church_db::models::donation::{Donation, DonationResponse};
use church_db::models::member::{Member, MemberResponse};
use serde::Serialize;
use serde_json::json;

use crate::bus::{event_types, ChurchEvent, EventBus};
use crate::email::{donation_thank_you_email, welcome_email, EmailRequest};

#[derive(Clone)]
pub struct EventPublisher {
    bus: Arc<EventBus>,
}

impl EventPublisher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    pub fn member_created(&self, member: &Member, actor: Option<DbId>) {
        tracing::info!(member_id = member.id, "Processing member created event");
        let message = MemberResponse::from(member.clone());
        if self.enqueue(event_types::MEMBER_CREATED, "member", member.id, actor, &message) {
            self.send_welcome_email(member, actor);
        }
    }

    /// The thank-you only goes out when the donation is linked to a member
    /// with an email address.
    pub fn donation_created(&self, donation: &Donation, member: Option<&Member>, actor: Option<DbId>) {
        tracing::info!(donation_id = donation.id, "Processing donation created event");
        let message = DonationResponse::from(donation.clone());
        if !self.enqueue(event_types::DONATION_CREATED, "donation", donation.id, actor, &message) {
            return;
        }
        match member {
            Some(member) if !member.email.trim().is_empty() => {
                self.send_donation_thank_you(donation, member, actor)
            }
            _ => tracing::debug!(donation_id = donation.id, "No member email, thank-you skipped"),
        }
    }

    /// Route a failure to the error queue.
    pub fn report_error(&self, context: &str, message: &str) {
        tracing::error!(context, error = message, "Handling error");
        self.bus.publish(
            ChurchEvent::new(event_types::ERROR)
                .with_payload(json!({ "context": context, "error": message })),
        );
    }

    fn send_welcome_email(&self, member: &Member, actor: Option<DbId>) {
        tracing::info!(member_id = member.id, "Sending welcome email");
        self.notify(welcome_email(member), "member", member.id, actor);
    }

    fn send_donation_thank_you(&self, donation: &Donation, member: &Member, actor: Option<DbId>) {
        tracing::info!(donation_id = donation.id, "Sending donation thank you email");
        let amount = format!("${:.2}", donation.amount);
        self.notify(donation_thank_you_email(member, &amount), "donation", donation.id, actor);
    }

    fn notify(&self, email: EmailRequest, entity_type: &str, entity_id: DbId, actor: Option<DbId>) {
        self.enqueue(event_types::EMAIL_NOTIFICATION, entity_type, entity_id, actor, &email);
    }

    /// Marshal `message` and publish it. Returns false when marshalling
    /// failed and the error was reported instead.
    fn enqueue<T: Serialize>(
        &self,
        event_type: &str,
        entity_type: &str,
        entity_id: DbId,
        actor: Option<DbId>,
        message: &T,
    ) -> bool {
        match serde_json::to_value(message) {
            Ok(payload) => {
                self.bus.publish(
                    ChurchEvent::new(event_type)
                        .with_source(entity_type, entity_id)
                        .with_actor(actor)
                        .with_payload(payload),
                );
                true
            }
            Err(e) => {
                self.report_error(event_type, &e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tokio::sync::broadcast;

    fn member(email: &str) -> Member {
        Member {
            id: 3,
            first_name: "Jane".into(),
            last_name: "Roe".into(),
            email: email.into(),
            phone_number: None,
            date_of_birth: None,
            address: None,
            membership_date: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            baptism_date: None,
            is_active: true,
            family_id: None,
            user_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn donation(member_id: Option<DbId>) -> Donation {
        Donation {
            id: 11,
            amount: Decimal::from_str("150.5").unwrap(),
            donation_type: "TITHE".into(),
            member_id,
            anonymous: false,
            notes: None,
            donation_date: Utc::now(),
            created_at: Utc::now(),
            member_name: member_id.map(|_| "Jane Roe".into()),
        }
    }

    fn drain(rx: &mut broadcast::Receiver<ChurchEvent>) -> Vec<ChurchEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn setup() -> (EventPublisher, broadcast::Receiver<ChurchEvent>) {
        let bus = Arc::new(EventBus::default());
        let rx = bus.subscribe();
        (EventPublisher::new(bus), rx)
    }

    #[test]
    fn member_created_publishes_record_then_welcome_email() {
        let (publisher, mut rx) = setup();
        publisher.member_created(&member("jane@example.com"), Some(1));

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "member.created");
        assert_eq!(events[0].payload["full_name"], "Jane Roe");
        assert_eq!(events[0].actor_user_id, Some(1));
        assert_eq!(events[1].event_type, "email.notification");
        assert_eq!(events[1].payload["to"], "jane@example.com");
        assert_eq!(events[1].payload["subject"], "Welcome to Our Church Community!");
    }

    #[test]
    fn linked_donation_gets_thank_you() {
        let (publisher, mut rx) = setup();
        publisher.donation_created(&donation(Some(3)), Some(&member("jane@example.com")), None);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "donation.created");
        assert_eq!(events[0].payload["donor_name"], "Jane Roe");
        assert_eq!(events[0].payload["amount"], "150.5");
        assert!(events[1].payload["body"]
            .as_str()
            .unwrap()
            .contains("generous donation of $150.50"));
    }

    #[test]
    fn unlinked_donation_stops_at_queue() {
        let (publisher, mut rx) = setup();
        publisher.donation_created(&donation(None), None, None);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "donation.created");
        assert_eq!(events[0].payload["donor_name"], "Unknown");
    }

    #[test]
    fn report_error_publishes_to_error_queue() {
        let (publisher, mut rx) = setup();
        publisher.report_error("member.created", "broken");

        let events = drain(&mut rx);
        assert_eq!(events[0].event_type, "error");
        assert_eq!(events[0].payload["error"], "broken");
    }
}
