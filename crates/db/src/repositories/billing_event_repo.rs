//! Repository for the billing webhook event log.

use crate::DbPool;

pub struct BillingEventRepo;

impl BillingEventRepo {
    /// Record a processed event. Returns `false` when the event id was
    /// already recorded (a concurrent redelivery lost the insert race).
    pub async fn record(
        pool: &DbPool,
        event_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO billing_events (event_id, event_type, payload) \
             VALUES ($1, $2, $3) ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(event_type)
        .bind(payload)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether an event id has already been processed.
    pub async fn seen(pool: &DbPool, event_id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM billing_events WHERE event_id = $1)")
            .bind(event_id)
            .fetch_one(pool)
            .await
    }
}
