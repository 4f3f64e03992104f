//! Integration tests for the stored-procedure dispatcher against the
//! report functions created by the migrations.

use chrono::{Duration, Utc};
use church_core::donation::DonationType;
use church_core::member::MemberDraft;
use church_db::models::donation::CreateDonation;
use church_db::procedures::{DatabaseService, ProcedureCall, PROCEDURE_NAME_HEADER};
use church_db::repositories::{DonationRepo, MemberRepo};
use serde_json::{json, Map, Value};
use sqlx::PgPool;

async fn seed_member_with_gifts(pool: &PgPool, email: &str, amounts: &[&str]) -> i64 {
    let draft = MemberDraft::builder()
        .first_name("Gina")
        .last_name("Donor")
        .email(email)
        .build(Utc::now().date_naive())
        .unwrap();
    let member = MemberRepo::create(pool, &draft).await.unwrap();
    for amount in amounts {
        DonationRepo::create(
            pool,
            &CreateDonation {
                amount: amount.parse().unwrap(),
                donation_type: DonationType::Tithe,
                member_id: Some(member.id),
                anonymous: false,
                notes: None,
                donation_date: Some(Utc::now() - Duration::hours(2)),
            },
        )
        .await
        .unwrap();
    }
    member.id
}

fn call(name: Option<&str>, body: Value) -> ProcedureCall {
    let mut headers = Map::new();
    if let Some(name) = name {
        headers.insert(PROCEDURE_NAME_HEADER.into(), json!(name));
    }
    ProcedureCall {
        procedure_name: name.map(str::to_string),
        headers,
        body,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_donation_summary_rows(pool: PgPool) {
    let member_id = seed_member_with_gifts(&pool, "gina@example.com", &["10.00", "15.50"]).await;
    let service = DatabaseService::new(pool);

    let outcome = service
        .call_procedure(&call(Some("get_member_donation_summary"), json!({ "member_id": member_id })))
        .await;

    assert!(!outcome.procedure_error, "{:?}", outcome.body);
    let rows = outcome.body["result"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(member_id));
    assert_eq!(rows[0]["full_name"], json!("Gina Donor"));
    assert_eq!(rows[0]["donation_count"], json!(2));
    assert_eq!(rows[0]["total_amount"], json!("25.50"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn camel_case_name_and_string_body(pool: PgPool) {
    seed_member_with_gifts(&pool, "gina@example.com", &["5.00"]).await;
    let service = DatabaseService::new(pool);

    let outcome = service
        .call_procedure(&call(Some("GetTopDonors"), json!(r#"{"limit_count": 5}"#)))
        .await;

    assert!(!outcome.procedure_error, "{:?}", outcome.body);
    assert_eq!(outcome.body["result"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_name_is_reported(pool: PgPool) {
    let service = DatabaseService::new(pool);
    let outcome = service.call_procedure(&call(None, Value::Null)).await;
    assert!(outcome.procedure_error);
    assert_eq!(outcome.body, json!({ "error": "Missing procedureName header" }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_procedure_is_an_error_document(pool: PgPool) {
    let service = DatabaseService::new(pool);
    let outcome = service.call_procedure(&call(Some("drop_everything"), Value::Null)).await;
    assert!(outcome.procedure_error);
    assert_eq!(outcome.body["error"], json!("Unknown procedure: drop_everything"));
}
