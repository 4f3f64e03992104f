//! Integration tests for the repository layer against a real database:
//! - Member create / lookup / search / soft delete
//! - Unique constraint naming used for 409 mapping
//! - Group membership and event registration bookkeeping
//! - Donation totals and the joined donor name
//! - Attendance defaults
//! - Audit log filtering

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, Utc};
use church_core::donation::DonationType;
use church_core::member::MemberDraft;
use church_core::roles::RoleType;
use church_db::models::attendance::CreateAttendance;
use church_db::models::audit::{AuditQuery, CreateAuditLog};
use church_db::models::donation::CreateDonation;
use church_db::models::event::{CreateEvent, CreateEventRegistration, Registration};
use church_db::models::family::CreateFamily;
use church_db::models::group::{CreateGroup, GroupJoin};
use church_db::models::session::CreateSession;
use church_db::models::user::CreateUser;
use church_db::models::volunteer::CreateVolunteer;
use church_db::repositories::{
    AttendanceRepo, AuditLogRepo, DonationRepo, EventRegistrationRepo, EventRepo, FamilyRepo,
    GroupRepo, MemberRepo, SessionRepo, UserRepo, VolunteerRepo,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn draft(first: &str, last: &str, email: &str) -> MemberDraft {
    MemberDraft::builder()
        .first_name(first)
        .last_name(last)
        .email(email)
        .build(today())
        .unwrap()
}

fn donation(amount: &str, kind: DonationType, member_id: Option<i64>) -> CreateDonation {
    CreateDonation {
        amount: amount.parse::<Decimal>().unwrap(),
        donation_type: kind,
        member_id,
        anonymous: false,
        notes: None,
        donation_date: Some(Utc::now() - Duration::hours(1)),
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_passes(pool: PgPool) {
    church_db::health_check(&pool).await.unwrap();
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_create_and_lookup(pool: PgPool) {
    let member = MemberRepo::create(&pool, &draft("John", "Doe", "john@example.com"))
        .await
        .unwrap();
    assert!(member.is_active);
    assert_eq!(member.membership_date, today());
    assert_eq!(member.full_name(), "John Doe");

    let by_email = MemberRepo::find_by_email(&pool, "JOHN@example.com").await.unwrap();
    assert_eq!(by_email.map(|m| m.id), Some(member.id));
    assert!(MemberRepo::exists_by_email(&pool, "john@example.com").await.unwrap());
    assert!(!MemberRepo::exists_by_email(&pool, "nobody@example.com").await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_member_email_hits_named_constraint(pool: PgPool) {
    MemberRepo::create(&pool, &draft("A", "One", "dup@example.com")).await.unwrap();
    let err = MemberRepo::create(&pool, &draft("B", "Two", "dup@example.com"))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_members_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_search_and_deactivate(pool: PgPool) {
    let john = MemberRepo::create(&pool, &draft("John", "Smith", "js@example.com")).await.unwrap();
    MemberRepo::create(&pool, &draft("Jane", "Doe", "jd@example.com")).await.unwrap();

    let found = MemberRepo::search(&pool, "smi").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, john.id);

    let deactivated = MemberRepo::deactivate(&pool, john.id).await.unwrap().unwrap();
    assert!(!deactivated.is_active);

    let active = MemberRepo::list_active(&pool).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].first_name, "Jane");

    assert!(MemberRepo::deactivate(&pool, 999_999).await.unwrap().is_none());

    assert!(MemberRepo::delete(&pool, john.id).await.unwrap());
    assert!(MemberRepo::find_by_id(&pool, john.id).await.unwrap().is_none());
    assert!(!MemberRepo::delete(&pool, john.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn members_listed_by_family_oldest_first(pool: PgPool) {
    let family = FamilyRepo::create(
        &pool,
        &CreateFamily {
            family_name: "Smith".into(),
            address: None,
            home_phone: None,
        },
    )
    .await
    .unwrap();

    let mut first = draft("Adam", "Smith", "adam@example.com");
    first.family_id = Some(family.id);
    let mut second = draft("Eve", "Smith", "eve@example.com");
    second.family_id = Some(family.id);
    let adam = MemberRepo::create(&pool, &first).await.unwrap();
    MemberRepo::create(&pool, &second).await.unwrap();

    let members = MemberRepo::list_by_family(&pool, family.id).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].id, adam.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn families_searched_by_address(pool: PgPool) {
    for (name, address) in [("Oak", Some("12 Elm Street")), ("Pine", Some("4 Harbor Road")), ("Ash", None)] {
        FamilyRepo::create(
            &pool,
            &CreateFamily {
                family_name: name.into(),
                address: address.map(str::to_string),
                home_phone: None,
            },
        )
        .await
        .unwrap();
    }

    assert!(FamilyRepo::search_by_address(&pool, "maple").await.unwrap().is_empty());
    let found = FamilyRepo::search_by_address(&pool, "ELM").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].family_name, "Oak");
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_role_round_trip(pool: PgPool) {
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            username: "pastor_bob".into(),
            email: "bob@example.com".into(),
            password_hash: "hash".into(),
            role: RoleType::Pastor,
        },
    )
    .await
    .unwrap();
    assert_eq!(user.role_type().unwrap(), RoleType::Pastor);
    assert!(user.enabled);
    assert!(UserRepo::exists_by_username(&pool, "pastor_bob").await.unwrap());
    assert_eq!(UserRepo::list_by_role(&pool, "PASTOR").await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_redeems_once_and_never_when_expired(pool: PgPool) {
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            username: "sess".into(),
            email: "sess@example.com".into(),
            password_hash: "hash".into(),
            role: RoleType::Member,
        },
    )
    .await
    .unwrap();
    for (hash, expires_at) in [
        ("live", Utc::now() + Duration::days(1)),
        ("stale", Utc::now() - Duration::minutes(1)),
    ] {
        SessionRepo::create(
            &pool,
            &CreateSession {
                user_id: user.id,
                refresh_token_hash: hash.into(),
                expires_at,
            },
        )
        .await
        .unwrap();
    }

    let redeemed = SessionRepo::redeem(&pool, "live").await.unwrap().unwrap();
    assert_eq!(redeemed.user_id, user.id);
    assert!(redeemed.is_revoked);
    assert!(SessionRepo::redeem(&pool, "live").await.unwrap().is_none());
    assert!(SessionRepo::redeem(&pool, "stale").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Groups and events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn group_membership_is_idempotent(pool: PgPool) {
    let member = MemberRepo::create(&pool, &draft("G", "Member", "g@example.com")).await.unwrap();
    let group = GroupRepo::create(
        &pool,
        &CreateGroup {
            name: "Choir".into(),
            description: None,
            leader_id: None,
            max_members: Some(2),
            is_active: None,
        },
    )
    .await
    .unwrap();
    assert!(group.is_active);

    assert_eq!(
        GroupRepo::add_member(&pool, group.id, member.id).await.unwrap(),
        GroupJoin::Added { member_count: 1 }
    );
    assert_eq!(
        GroupRepo::add_member(&pool, group.id, member.id).await.unwrap(),
        GroupJoin::AlreadyMember
    );
    assert_eq!(GroupRepo::count_members(&pool, group.id).await.unwrap(), 1);
    assert!(GroupRepo::remove_member(&pool, group.id, member.id).await.unwrap());
    assert_eq!(GroupRepo::count_members(&pool, group.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_group_and_event_refuse_new_members(pool: PgPool) {
    let first = MemberRepo::create(&pool, &draft("Fi", "Rst", "first@example.com")).await.unwrap();
    let second = MemberRepo::create(&pool, &draft("Se", "Cond", "second@example.com")).await.unwrap();

    let group = GroupRepo::create(
        &pool,
        &CreateGroup {
            name: "Duo".into(),
            description: None,
            leader_id: None,
            max_members: Some(1),
            is_active: None,
        },
    )
    .await
    .unwrap();
    GroupRepo::add_member(&pool, group.id, first.id).await.unwrap();
    assert_eq!(
        GroupRepo::add_member(&pool, group.id, second.id).await.unwrap(),
        GroupJoin::Full
    );

    let event = EventRepo::create(
        &pool,
        &CreateEvent {
            name: "Supper".into(),
            description: None,
            start_date: Utc::now() + Duration::days(3),
            end_date: None,
            location: None,
            max_capacity: Some(1),
            is_active: None,
        },
    )
    .await
    .unwrap();
    let register = |member_id| CreateEventRegistration { member_id, notes: None };
    EventRegistrationRepo::create(&pool, event.id, &register(first.id)).await.unwrap();
    assert_matches!(
        EventRegistrationRepo::create(&pool, event.id, &register(second.id)).await.unwrap(),
        Registration::Full
    );

    let missing = GroupRepo::add_member(&pool, 999_999, first.id).await.unwrap_err();
    assert_matches!(missing, sqlx::Error::RowNotFound);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn groups_listed_by_leader(pool: PgPool) {
    let leader = MemberRepo::create(&pool, &draft("Lee", "Leader", "lee@example.com")).await.unwrap();
    for (name, leader_id) in [("Youth", Some(leader.id)), ("Bible Study", Some(leader.id)), ("Choir", None)] {
        GroupRepo::create(
            &pool,
            &CreateGroup {
                name: name.into(),
                description: None,
                leader_id,
                max_members: None,
                is_active: None,
            },
        )
        .await
        .unwrap();
    }

    let led = GroupRepo::list_by_leader(&pool, leader.id).await.unwrap();
    let names: Vec<_> = led.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Bible Study", "Youth"]);

    let found = GroupRepo::search_by_name(&pool, "bible").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Bible Study");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn event_registration_unique_per_member(pool: PgPool) {
    let member = MemberRepo::create(&pool, &draft("E", "Goer", "e@example.com")).await.unwrap();
    let event = EventRepo::create(
        &pool,
        &CreateEvent {
            name: "Picnic".into(),
            description: None,
            start_date: Utc::now() + Duration::days(7),
            end_date: None,
            location: Some("Park".into()),
            max_capacity: Some(10),
            is_active: None,
        },
    )
    .await
    .unwrap();

    let input = CreateEventRegistration {
        member_id: member.id,
        notes: None,
    };
    assert_matches!(
        EventRegistrationRepo::create(&pool, event.id, &input).await.unwrap(),
        Registration::Created(r) if r.member_id == member.id
    );
    assert_matches!(
        EventRegistrationRepo::create(&pool, event.id, &input).await.unwrap(),
        Registration::AlreadyRegistered
    );
    assert_eq!(EventRepo::registration_count(&pool, event.id).await.unwrap(), 1);
    assert!(EventRegistrationRepo::find_by_event_and_member(&pool, event.id, member.id)
        .await
        .unwrap()
        .is_some());

    let marked = EventRegistrationRepo::mark_attended(&pool, event.id, member.id, true)
        .await
        .unwrap()
        .unwrap();
    assert!(marked.attended);

    let mine = EventRegistrationRepo::list_by_member(&pool, member.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].event_id, event.id);

    let attended = EventRegistrationRepo::list_by_attended(&pool, event.id, true).await.unwrap();
    assert_eq!(attended.len(), 1);
    assert!(EventRegistrationRepo::list_by_attended(&pool, event.id, false)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn events_by_start_range_and_location(pool: PgPool) {
    let now = Utc::now();
    for (name, days, location) in [("Retreat", 3, "Lakeside Camp"), ("Concert", 30, "Main Hall")] {
        EventRepo::create(
            &pool,
            &CreateEvent {
                name: name.into(),
                description: None,
                start_date: now + Duration::days(days),
                end_date: None,
                location: Some(location.into()),
                max_capacity: None,
                is_active: None,
            },
        )
        .await
        .unwrap();
    }

    let soon = EventRepo::list_by_start_range(&pool, now, now + Duration::days(7)).await.unwrap();
    assert_eq!(soon.len(), 1);
    assert_eq!(soon[0].name, "Retreat");

    let hall = EventRepo::search_by_location(&pool, "hall").await.unwrap();
    assert_eq!(hall.len(), 1);
    assert_eq!(hall[0].name, "Concert");
}

// ---------------------------------------------------------------------------
// Donations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn donation_carries_member_name_and_totals(pool: PgPool) {
    let member = MemberRepo::create(&pool, &draft("Mary", "Giver", "mary@example.com")).await.unwrap();

    let linked = DonationRepo::create(&pool, &donation("100.00", DonationType::Tithe, Some(member.id)))
        .await
        .unwrap();
    assert_eq!(linked.donor_name(), "Mary Giver");

    let unlinked = DonationRepo::create(&pool, &donation("25.50", DonationType::Offering, None))
        .await
        .unwrap();
    assert_eq!(unlinked.donor_name(), "Unknown");

    let total = DonationRepo::sum_by_member(&pool, member.id).await.unwrap();
    assert_eq!(total, "100.00".parse::<Decimal>().unwrap());

    let start = Utc::now() - Duration::days(1);
    let end = Utc::now();
    let by_type = DonationRepo::sum_by_type_in_range(&pool, start, end).await.unwrap();
    assert_eq!(by_type.len(), 2);

    let tithes = DonationRepo::list_by_type_and_range(&pool, DonationType::Tithe, start, end)
        .await
        .unwrap();
    assert_eq!(tithes.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn donations_filtered_by_anonymous_flag(pool: PgPool) {
    let mut hidden = donation("40.00", DonationType::Missions, None);
    hidden.anonymous = true;
    DonationRepo::create(&pool, &hidden).await.unwrap();
    DonationRepo::create(&pool, &donation("5.00", DonationType::Offering, None)).await.unwrap();

    let anonymous = DonationRepo::list_by_anonymous(&pool, true).await.unwrap();
    assert_eq!(anonymous.len(), 1);
    assert_eq!(anonymous[0].donor_name(), "Anonymous");
    assert_eq!(DonationRepo::list_by_anonymous(&pool, false).await.unwrap().len(), 1);

    let now = Utc::now();
    assert_eq!(DonationRepo::list_by_range(&pool, now - Duration::days(1), now).await.unwrap().len(), 2);
    assert!(DonationRepo::list_by_range(&pool, now - Duration::days(30), now - Duration::days(2))
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_without_donations_totals_zero(pool: PgPool) {
    let member = MemberRepo::create(&pool, &draft("No", "Gifts", "none@example.com")).await.unwrap();
    assert_eq!(DonationRepo::sum_by_member(&pool, member.id).await.unwrap(), Decimal::ZERO);
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn attendance_defaults_and_service_type_filter(pool: PgPool) {
    let member = MemberRepo::create(&pool, &draft("Pat", "Pew", "pat@example.com")).await.unwrap();

    let sunday = AttendanceRepo::create(
        &pool,
        &CreateAttendance {
            member_id: member.id,
            service_date: None,
            service_type: Some("  ".into()),
            check_in_time: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(sunday.service_type, "Sunday Service");
    assert_eq!(sunday.service_date, today());

    AttendanceRepo::create(
        &pool,
        &CreateAttendance {
            member_id: member.id,
            service_date: None,
            service_type: Some("Wednesday Prayer".into()),
            check_in_time: None,
        },
    )
    .await
    .unwrap();

    let prayer = AttendanceRepo::list_by_service_type(&pool, "Wednesday Prayer").await.unwrap();
    assert_eq!(prayer.len(), 1);
    let fetched = AttendanceRepo::find_by_id(&pool, prayer[0].id).await.unwrap().unwrap();
    assert_eq!(fetched.member_id, member.id);
    assert_eq!(AttendanceRepo::list_by_service_type(&pool, "Sunday Service").await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Volunteers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_active_volunteers_listed(pool: PgPool) {
    let member = MemberRepo::create(&pool, &draft("Val", "Helper", "val@example.com")).await.unwrap();
    for (role, active) in [("Usher", None), ("Greeter", Some(false))] {
        VolunteerRepo::create(
            &pool,
            &CreateVolunteer {
                member_id: member.id,
                role: role.into(),
                description: None,
                start_date: None,
                end_date: None,
                is_active: active,
            },
        )
        .await
        .unwrap();
    }

    let active = VolunteerRepo::list_active(&pool).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].role, "Usher");
    assert_eq!(VolunteerRepo::list_by_member(&pool, member.id).await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Audit logs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn audit_logs_filter_and_count(pool: PgPool) {
    for (action, success) in [("MEMBER_CREATED", true), ("ERROR_OCCURRED", false), ("EMAIL_SENT", true)] {
        AuditLogRepo::insert(
            &pool,
            &CreateAuditLog {
                action: action.into(),
                data: Some(serde_json::json!({ "k": action })),
                success,
                user_id: None,
                entity_type: None,
                entity_id: None,
            },
        )
        .await
        .unwrap();
    }

    let failures = AuditQuery {
        success: Some(false),
        ..Default::default()
    };
    let rows = AuditLogRepo::query(&pool, &failures).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].action, "ERROR_OCCURRED");
    assert_eq!(AuditLogRepo::count(&pool, &AuditQuery::default()).await.unwrap(), 3);
}
