//! Billing webhook event log model.

use sqlx::FromRow;

use flyerforge_core::types::{DbId, Timestamp};

/// A processed billing webhook event. The unique `event_id` is what makes
/// redeliveries detectable.
#[derive(Debug, Clone, FromRow)]
pub struct BillingEvent {
    pub id: DbId,
    pub event_id: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
