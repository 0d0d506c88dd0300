//! Billing webhook handler.
//!
//! Events arrive as a provider-neutral envelope `{id, type, data}` signed
//! with HMAC-SHA256 over the raw body, hex-encoded in the
//! `x-billing-signature` header. Every applied mutation is an absolute
//! assignment and processed event ids are recorded, so redeliveries
//! acknowledge without changing anything twice. Unknown event types and
//! unknown accounts are acknowledged too; the provider should only retry
//! on our failures.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;

use flyerforge_core::plans::{PlanTier, SubscriptionStatus};
use flyerforge_core::types::{DbId, Timestamp};
use flyerforge_db::models::Account;
use flyerforge_db::repositories::{AccountRepo, BillingEventRepo, CreditLedger};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct BillingEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutData {
    account_id: DbId,
    plan: String,
    customer_ref: String,
    #[serde(default)]
    subscription_ref: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    current_period_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionData {
    customer_ref: String,
    #[serde(default)]
    plan: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    current_period_end: Option<i64>,
    #[serde(default)]
    billing_reason: Option<String>,
}

/// POST /api/v1/billing/events
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    // 1. Verify the signature over the raw body before parsing anything.
    let signature = headers
        .get("x-billing-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("No signature".to_string()))?;
    verify_signature(&state.config.billing_webhook_secret, &body, signature)?;

    // 2. Decode the envelope.
    let event: BillingEvent = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid event payload".to_string()))?;

    // 3. Skip already-processed deliveries.
    if BillingEventRepo::seen(&state.pool, &event.id).await? {
        tracing::info!(event_id = %event.id, "duplicate billing event skipped");
        return Ok(Json(json!({ "received": true })));
    }

    // 4. Dispatch.
    dispatch(&state, &event).await?;

    // 5. Record the event id so replays become no-ops.
    BillingEventRepo::record(&state.pool, &event.id, &event.event_type, &event.data).await?;

    Ok(Json(json!({ "received": true })))
}

// ---- private helpers ----

async fn dispatch(state: &AppState, event: &BillingEvent) -> Result<(), AppError> {
    match event.event_type.as_str() {
        "checkout.completed" => handle_checkout(state, parse_data(event)?).await,
        "subscription.updated" => handle_subscription_updated(state, parse_data(event)?).await,
        "subscription.deleted" => handle_subscription_deleted(state, parse_data(event)?).await,
        "invoice.paid" => handle_invoice_paid(state, parse_data(event)?).await,
        "invoice.payment_failed" => handle_payment_failed(state, parse_data(event)?).await,
        other => {
            tracing::info!(event_type = %other, "unhandled billing event type");
            Ok(())
        }
    }
}

/// Initial purchase: set the plan, grant the full allotment, link the
/// billing references.
async fn handle_checkout(state: &AppState, data: CheckoutData) -> Result<(), AppError> {
    let plan: PlanTier = data.plan.parse()?;

    let updated = CreditLedger::apply_checkout(
        &state.pool,
        data.account_id,
        plan,
        &data.customer_ref,
        data.subscription_ref.as_deref(),
        period_end(data.current_period_end),
    )
    .await?;

    if !updated {
        tracing::warn!(account_id = data.account_id, "checkout for unknown account");
    }
    Ok(())
}

/// Plan or status change mid-cycle. Never touches the credit balance.
async fn handle_subscription_updated(
    state: &AppState,
    data: SubscriptionData,
) -> Result<(), AppError> {
    let Some(account) = find_by_customer(state, &data.customer_ref).await? else {
        return Ok(());
    };

    let plan: Option<PlanTier> = data.plan.as_deref().map(str::parse).transpose()?;
    let status = SubscriptionStatus::from_provider(data.status.as_deref().unwrap_or("active"));

    CreditLedger::apply_subscription_state(
        &state.pool,
        account.id,
        plan,
        status,
        period_end(data.current_period_end),
    )
    .await?;
    Ok(())
}

/// Subscription ended: back to the free tier and its allotment.
async fn handle_subscription_deleted(
    state: &AppState,
    data: SubscriptionData,
) -> Result<(), AppError> {
    let Some(account) = find_by_customer(state, &data.customer_ref).await? else {
        return Ok(());
    };

    CreditLedger::apply_cancellation(&state.pool, account.id).await?;
    Ok(())
}

/// Renewal payment. Only `subscription_cycle` invoices reset credits;
/// the initial invoice after checkout would otherwise double-grant.
async fn handle_invoice_paid(state: &AppState, data: SubscriptionData) -> Result<(), AppError> {
    if data.billing_reason.as_deref() != Some("subscription_cycle") {
        tracing::debug!(
            billing_reason = ?data.billing_reason,
            "invoice ignored, not a cycle renewal"
        );
        return Ok(());
    }

    let Some(account) = find_by_customer(state, &data.customer_ref).await? else {
        return Ok(());
    };

    // The invoice may carry the plan; fall back to what is on the account.
    let plan = match data.plan.as_deref() {
        Some(value) => value.parse()?,
        None => account
            .plan
            .parse()
            .map_err(|_| AppError::InternalError(format!("Stored plan invalid: {}", account.plan)))?,
    };

    CreditLedger::apply_cycle_renewal(
        &state.pool,
        account.id,
        plan,
        period_end(data.current_period_end),
    )
    .await?;
    Ok(())
}

async fn handle_payment_failed(state: &AppState, data: SubscriptionData) -> Result<(), AppError> {
    let Some(account) = find_by_customer(state, &data.customer_ref).await? else {
        return Ok(());
    };

    CreditLedger::mark_past_due(&state.pool, account.id).await?;
    Ok(())
}

async fn find_by_customer(
    state: &AppState,
    customer_ref: &str,
) -> Result<Option<Account>, AppError> {
    let account = AccountRepo::find_by_customer_ref(&state.pool, customer_ref).await?;
    if account.is_none() {
        tracing::warn!(customer_ref, "billing event for unknown customer");
    }
    Ok(account)
}

fn parse_data<T: serde::de::DeserializeOwned>(event: &BillingEvent) -> Result<T, AppError> {
    serde_json::from_value(event.data.clone())
        .map_err(|_| AppError::BadRequest("Invalid event payload".to_string()))
}

fn verify_signature(secret: &str, body: &[u8], provided: &str) -> Result<(), AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::InternalError("Webhook secret is invalid".to_string()))?;
    mac.update(body);

    let provided = decode_hex(provided)
        .ok_or_else(|| AppError::BadRequest("Invalid signature".to_string()))?;

    // verify_slice gives a constant-time comparison.
    mac.verify_slice(&provided)
        .map_err(|_| AppError::BadRequest("Invalid signature".to_string()))
}

fn decode_hex(value: &str) -> Option<Vec<u8>> {
    if value.len() % 2 != 0 || !value.is_ascii() {
        return None;
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).ok())
        .collect()
}

fn period_end(unix_seconds: Option<i64>) -> Option<Timestamp> {
    unix_seconds.and_then(|seconds| chrono::DateTime::from_timestamp(seconds, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let body = br#"{"id":"evt_1","type":"noop","data":{}}"#;
        let signature = sign("whsec_test", body);
        assert!(verify_signature("whsec_test", body, &signature).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let signature = sign("whsec_test", b"original body");
        assert!(verify_signature("whsec_test", b"tampered body", &signature).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = b"some body";
        let signature = sign("whsec_other", body);
        assert!(verify_signature("whsec_test", body, &signature).is_err());
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        assert!(verify_signature("whsec_test", b"body", "not hex at all!").is_err());
    }

    #[test]
    fn test_decode_hex_round_trip() {
        assert_eq!(decode_hex("00ff10"), Some(vec![0x00, 0xff, 0x10]));
        assert_eq!(decode_hex("0"), None, "odd length");
        assert_eq!(decode_hex("zz"), None);
    }

    #[test]
    fn test_period_end_conversion() {
        let ts = period_end(Some(1_735_689_600)).unwrap();
        assert_eq!(ts.timestamp(), 1_735_689_600);
        assert!(period_end(None).is_none());
    }
}
