//! Billing webhook: signatures, idempotency, and credit state transitions.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use sqlx::PgPool;

use common::*;

async fn account_billing_state(
    pool: &PgPool,
    account_id: i64,
) -> (String, i32, String, Option<String>, Option<String>) {
    sqlx::query_as(
        "SELECT plan, credits_remaining, subscription_status, billing_customer_ref, \
         billing_subscription_ref FROM accounts WHERE id = $1",
    )
    .bind(account_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

fn checkout_event(event_id: &str, account_id: i64, plan: &str) -> serde_json::Value {
    json!({
        "id": event_id,
        "type": "checkout.completed",
        "data": {
            "accountId": account_id,
            "plan": plan,
            "customerRef": "cus_123",
            "subscriptionRef": "sub_123",
            "currentPeriodEnd": 1_767_225_600,
        }
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_checkout_applies_plan_and_grants_allotment(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (account_id, _) = register_account(&app, "dana@example.com").await;

    let response = post_webhook(&app, checkout_event("evt_1", account_id, "pro")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["received"], true);

    let (plan, credits, status, customer_ref, subscription_ref) =
        account_billing_state(&pool, account_id).await;
    assert_eq!(plan, "pro");
    assert_eq!(credits, 100);
    assert_eq!(status, "active");
    assert_eq!(customer_ref.as_deref(), Some("cus_123"));
    assert_eq!(subscription_ref.as_deref(), Some("sub_123"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_signature_rejected(pool: PgPool) {
    let app = build_test_app(pool);

    let response = send(
        &app,
        Request::post("/api/v1/billing/events")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                checkout_event("evt_1", 1, "pro").to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "No signature");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_signature_rejected(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (account_id, _) = register_account(&app, "dana@example.com").await;

    let raw = checkout_event("evt_1", account_id, "pro").to_string();
    let response = send(
        &app,
        Request::post("/api/v1/billing/events")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-billing-signature", sign_webhook("different body"))
            .body(Body::from(raw))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid signature");

    // Nothing was applied.
    let (plan, credits, ..) = account_billing_state(&pool, account_id).await;
    assert_eq!(plan, "free");
    assert_eq!(credits, 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_event_is_acknowledged_but_not_reapplied(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (account_id, _) = register_account(&app, "dana@example.com").await;

    let renewal = json!({
        "id": "evt_renewal",
        "type": "invoice.paid",
        "data": {
            "customerRef": "cus_123",
            "plan": "starter",
            "billingReason": "subscription_cycle",
            "currentPeriodEnd": 1_767_225_600,
        }
    });

    post_webhook(&app, checkout_event("evt_1", account_id, "starter")).await;
    set_credits(&pool, account_id, 5).await;

    let first = post_webhook(&app, renewal.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(credits_of(&pool, account_id).await, 30, "renewal resets");

    // Spend some credits, then replay the exact same delivery.
    set_credits(&pool, account_id, 7).await;
    let replay = post_webhook(&app, renewal).await;
    assert_eq!(replay.status(), StatusCode::OK);
    assert_eq!(
        credits_of(&pool, account_id).await,
        7,
        "replayed event must not reset again"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_non_cycle_invoice_does_not_reset(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (account_id, _) = register_account(&app, "dana@example.com").await;
    post_webhook(&app, checkout_event("evt_1", account_id, "starter")).await;
    set_credits(&pool, account_id, 4).await;

    let response = post_webhook(
        &app,
        json!({
            "id": "evt_2",
            "type": "invoice.paid",
            "data": {
                "customerRef": "cus_123",
                "billingReason": "subscription_create",
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        credits_of(&pool, account_id).await,
        4,
        "only cycle renewals grant credits"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_subscription_update_changes_plan_without_credits(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (account_id, _) = register_account(&app, "dana@example.com").await;
    post_webhook(&app, checkout_event("evt_1", account_id, "starter")).await;
    set_credits(&pool, account_id, 12).await;

    let response = post_webhook(
        &app,
        json!({
            "id": "evt_2",
            "type": "subscription.updated",
            "data": {
                "customerRef": "cus_123",
                "plan": "agency",
                "status": "active",
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let (plan, credits, status, ..) = account_billing_state(&pool, account_id).await;
    assert_eq!(plan, "agency");
    assert_eq!(credits, 12, "mid-cycle plan change leaves the balance alone");
    assert_eq!(status, "active");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancellation_returns_to_free_tier(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (account_id, _) = register_account(&app, "dana@example.com").await;
    post_webhook(&app, checkout_event("evt_1", account_id, "pro")).await;

    let response = post_webhook(
        &app,
        json!({
            "id": "evt_2",
            "type": "subscription.deleted",
            "data": { "customerRef": "cus_123" }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let (plan, credits, status, customer_ref, subscription_ref) =
        account_billing_state(&pool, account_id).await;
    assert_eq!(plan, "free");
    assert_eq!(credits, 3);
    assert_eq!(status, "cancelled");
    assert_eq!(
        customer_ref.as_deref(),
        Some("cus_123"),
        "customer ref survives for reactivation"
    );
    assert!(subscription_ref.is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_payment_failure_marks_past_due(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (account_id, _) = register_account(&app, "dana@example.com").await;
    post_webhook(&app, checkout_event("evt_1", account_id, "starter")).await;
    set_credits(&pool, account_id, 9).await;

    let response = post_webhook(
        &app,
        json!({
            "id": "evt_2",
            "type": "invoice.payment_failed",
            "data": { "customerRef": "cus_123" }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let (plan, credits, status, ..) = account_billing_state(&pool, account_id).await;
    assert_eq!(status, "past_due");
    assert_eq!(plan, "starter", "plan is unchanged until deletion");
    assert_eq!(credits, 9);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_event_type_is_acknowledged(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_webhook(
        &app,
        json!({
            "id": "evt_1",
            "type": "charge.refunded",
            "data": {}
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["received"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_customer_is_acknowledged(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_webhook(
        &app,
        json!({
            "id": "evt_1",
            "type": "subscription.deleted",
            "data": { "customerRef": "cus_nobody" }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "no retry storm for stale refs");
}
