//! HTTP-level tests for `/api/donations`.

mod common;

use axum::http::StatusCode;
use axum::Router;
use church_core::roles::RoleType;
use common::{body_json, build_test_app, delete_auth, get_auth, post_json_auth, token_for};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::PgPool;

const MARCH: &str = "start_date=2024-03-01T00:00:00Z&end_date=2024-03-31T23:59:59Z";

fn decimal(value: &Value) -> Decimal {
    value.as_str().expect("decimals serialize as strings").parse().unwrap()
}

async fn create_member(app: &Router, token: &str) -> i64 {
    let response = post_json_auth(
        app.clone(),
        "/api/members",
        json!({ "first_name": "Ruth", "last_name": "Giver", "email": "ruth@example.com" }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn donate(app: &Router, token: &str, body: Value) -> Value {
    let response = post_json_auth(app.clone(), "/api/donations", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_names_the_donor(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = token_for(&pool, &app, "admin", RoleType::Admin).await;
    let member_id = create_member(&app, &admin).await;

    let named = donate(
        &app,
        &admin,
        json!({ "amount": "100.00", "donation_type": "TITHE", "member_id": member_id }),
    )
    .await;
    assert_eq!(named["donor_name"], "Ruth Giver");
    assert_eq!(decimal(&named["amount"]), Decimal::new(10000, 2));

    let anonymous = donate(
        &app,
        &admin,
        json!({
            "amount": "25.50",
            "donation_type": "OFFERING",
            "member_id": member_id,
            "anonymous": true
        }),
    )
    .await;
    assert_eq!(anonymous["donor_name"], "Anonymous");

    let nobody = donate(&app, &admin, json!({ "amount": "5", "donation_type": "OTHER" })).await;
    assert_eq!(nobody["donor_name"], "Unknown");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_bad_input(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = token_for(&pool, &app, "admin", RoleType::Admin).await;

    let zero = post_json_auth(
        app.clone(),
        "/api/donations",
        json!({ "amount": "0", "donation_type": "TITHE" }),
        &admin,
    )
    .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(zero).await["error"], "Donation amount must be greater than 0");

    let future = post_json_auth(
        app.clone(),
        "/api/donations",
        json!({ "amount": "10", "donation_type": "TITHE", "donation_date": "2999-01-01T00:00:00Z" }),
        &admin,
    )
    .await;
    assert_eq!(future.status(), StatusCode::BAD_REQUEST);

    for amount in ["0.001", "100000000.00"] {
        let unstorable = post_json_auth(
            app.clone(),
            "/api/donations",
            json!({ "amount": amount, "donation_type": "TITHE" }),
            &admin,
        )
        .await;
        assert_eq!(unstorable.status(), StatusCode::BAD_REQUEST, "amount {amount}");
        assert_eq!(body_json(unstorable).await["code"], "VALIDATION_ERROR");
    }

    let largest = post_json_auth(
        app.clone(),
        "/api/donations",
        json!({ "amount": "99999999.99", "donation_type": "TITHE" }),
        &admin,
    )
    .await;
    assert_eq!(largest.status(), StatusCode::CREATED);

    let no_member = post_json_auth(
        app,
        "/api/donations",
        json!({ "amount": "10", "donation_type": "TITHE", "member_id": 987654 }),
        &admin,
    )
    .await;
    assert_eq!(no_member.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_total_sums_every_donation(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = token_for(&pool, &app, "admin", RoleType::Admin).await;
    let member_id = create_member(&app, &admin).await;

    for amount in ["10.25", "20.25", "0.50"] {
        donate(
            &app,
            &admin,
            json!({ "amount": amount, "donation_type": "MISSIONS", "member_id": member_id }),
        )
        .await;
    }

    let total = get_auth(app.clone(), &format!("/api/donations/member/{member_id}/total"), &admin).await;
    assert_eq!(total.status(), StatusCode::OK);
    let total = body_json(total).await;
    assert_eq!(total["member_id"], member_id);
    assert_eq!(decimal(&total["total"]), Decimal::new(3100, 2));

    let none = body_json(get_auth(app.clone(), "/api/donations/member/555/total", &admin).await).await;
    assert_eq!(decimal(&none["total"]), Decimal::ZERO);

    let listed = body_json(get_auth(app, &format!("/api/donations/member/{member_id}"), &admin).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn statistics_cover_every_type(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = token_for(&pool, &app, "plain", RoleType::Member).await;

    donate(
        &app,
        &token,
        json!({ "amount": "40", "donation_type": "TITHE", "donation_date": "2024-03-10T10:00:00Z" }),
    )
    .await;
    donate(
        &app,
        &token,
        json!({ "amount": "60", "donation_type": "TITHE", "donation_date": "2024-03-20T10:00:00Z" }),
    )
    .await;
    donate(
        &app,
        &token,
        json!({ "amount": "999", "donation_type": "SPECIAL", "donation_date": "2024-04-02T10:00:00Z" }),
    )
    .await;

    let response = get_auth(app.clone(), &format!("/api/donations/statistics?{MARCH}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;

    assert_eq!(decimal(&stats["total_amount"]), Decimal::from(100));
    let by_type = stats["donations_by_type"].as_object().unwrap();
    assert_eq!(by_type.len(), 6);
    assert_eq!(decimal(&by_type["TITHE"]), Decimal::from(100));
    assert_eq!(decimal(&by_type["SPECIAL"]), Decimal::ZERO);
    assert_eq!(decimal(&by_type["BUILDING_FUND"]), Decimal::ZERO);

    let unbounded = get_auth(app.clone(), "/api/donations/statistics", &token).await;
    assert_eq!(unbounded.status(), StatusCode::BAD_REQUEST);

    let half = get_auth(
        app,
        "/api/donations/statistics?start_date=2024-03-01T00:00:00Z",
        &token,
    )
    .await;
    assert_eq!(half.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_by_type_accepts_any_case(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = token_for(&pool, &app, "plain", RoleType::Member).await;

    donate(
        &app,
        &token,
        json!({ "amount": "15", "donation_type": "BUILDING_FUND", "donation_date": "2024-03-05T09:00:00Z" }),
    )
    .await;
    donate(&app, &token, json!({ "amount": "15", "donation_type": "OFFERING" })).await;

    let all = body_json(get_auth(app.clone(), "/api/donations/type/building_fund", &token).await).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let in_march = body_json(
        get_auth(app.clone(), &format!("/api/donations/type/BUILDING_FUND?{MARCH}"), &token).await,
    )
    .await;
    assert_eq!(in_march.as_array().unwrap().len(), 1);

    let total = body_json(
        get_auth(app.clone(), &format!("/api/donations/type/building_fund/total?{MARCH}"), &token).await,
    )
    .await;
    assert_eq!(total["donation_type"], "BUILDING_FUND");
    assert_eq!(total["donation_count"], 1);
    assert_eq!(decimal(&total["total"]), Decimal::from(15));

    let none = body_json(get_auth(app.clone(), "/api/donations/type/special/total", &token).await).await;
    assert_eq!(none["donation_count"], 0);
    assert_eq!(decimal(&none["total"]), Decimal::ZERO);

    let unknown = get_auth(app, "/api/donations/type/bribe", &token).await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(unknown).await["error"], "Unknown donation type: bribe");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_admins_delete(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = token_for(&pool, &app, "admin", RoleType::Admin).await;
    let member = token_for(&pool, &app, "plain", RoleType::Member).await;

    let donation = donate(&app, &member, json!({ "amount": "12", "donation_type": "TITHE" })).await;
    let uri = format!("/api/donations/{}", donation["id"]);

    assert_eq!(delete_auth(app.clone(), &uri, &member).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(delete_auth(app.clone(), &uri, &admin).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get_auth(app.clone(), &uri, &admin).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete_auth(app, &uri, &admin).await.status(), StatusCode::NOT_FOUND);
}
