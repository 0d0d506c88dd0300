//! Credit ledger operations.
//!
//! The generation workflow checks the balance up front without reserving
//! anything, and only pays once a result exists. The decrement is
//! conditional (`credits_remaining >= 1`) and runs in the same transaction
//! as the artifact insert and the status flip, so two generations racing
//! on a one-credit account cannot both settle: the loser's transaction
//! rolls back whole and the caller sees the exhausted balance.
//!
//! Billing-side mutations are absolute assignments (reset to a plan's
//! allotment, set a status), never increments, which keeps webhook
//! redeliveries harmless.

use flyerforge_core::plans::{PlanTier, SubscriptionStatus};
use flyerforge_core::types::{DbId, Timestamp};

use crate::models::generated_image::{CreateGeneratedImage, GeneratedImage};
use crate::models::project::STATUS_COMPLETED;
use crate::DbPool;

const GENERATED_IMAGE_COLUMNS: &str = "id, project_id, account_id, remote_url, inline_data, \
                                       mime_type, params, created_at, updated_at";

pub struct CreditLedger;

impl CreditLedger {
    /// Whether the account could pay for one generation right now. Purely
    /// advisory; nothing is reserved.
    pub async fn has_available_credit(
        pool: &DbPool,
        account_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let available: Option<bool> =
            sqlx::query_scalar("SELECT credits_remaining >= 1 FROM accounts WHERE id = $1")
                .bind(account_id)
                .fetch_optional(pool)
                .await?;
        Ok(available.unwrap_or(false))
    }

    /// Settle a successful generation: persist the result, mark the
    /// project completed, and debit one credit, all in one transaction.
    ///
    /// Returns `None` when the balance hit zero between the up-front check
    /// and now. In that case nothing is persisted and the caller decides
    /// what to do with the project row.
    pub async fn finalize_generation(
        pool: &DbPool,
        data: &CreateGeneratedImage,
    ) -> Result<Option<GeneratedImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            r#"
            INSERT INTO generated_images (project_id, account_id, remote_url, inline_data, mime_type, params)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {GENERATED_IMAGE_COLUMNS}
            "#
        );
        let image = sqlx::query_as::<_, GeneratedImage>(&insert)
            .bind(data.project_id)
            .bind(data.account_id)
            .bind(&data.remote_url)
            .bind(&data.inline_data)
            .bind(&data.mime_type)
            .bind(&data.params)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE projects SET status = $2 WHERE id = $1")
            .bind(data.project_id)
            .bind(STATUS_COMPLETED)
            .execute(&mut *tx)
            .await?;

        let debit = sqlx::query(
            "UPDATE accounts SET credits_remaining = credits_remaining - 1 \
             WHERE id = $1 AND credits_remaining >= 1",
        )
        .bind(data.account_id)
        .execute(&mut *tx)
        .await?;

        if debit.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(image))
    }

    /// A completed checkout: move the account onto the purchased plan with
    /// a fresh allotment and attach the provider references.
    pub async fn apply_checkout(
        pool: &DbPool,
        account_id: DbId,
        plan: PlanTier,
        customer_ref: &str,
        subscription_ref: Option<&str>,
        period_end: Option<Timestamp>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET plan = $2,
                credits_remaining = $3,
                subscription_status = 'active',
                billing_customer_ref = $4,
                billing_subscription_ref = $5,
                current_period_end = $6
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(plan.as_str())
        .bind(plan.monthly_credits())
        .bind(customer_ref)
        .bind(subscription_ref)
        .bind(period_end)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A paid renewal invoice: reset the balance to the plan allotment.
    /// The reset is an absolute assignment, so replaying the same invoice
    /// cannot stack credits.
    pub async fn apply_cycle_renewal(
        pool: &DbPool,
        account_id: DbId,
        plan: PlanTier,
        period_end: Option<Timestamp>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET credits_remaining = $2,
                subscription_status = 'active',
                current_period_end = COALESCE($3, current_period_end)
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(plan.monthly_credits())
        .bind(period_end)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A subscription state change that does not touch the balance.
    pub async fn apply_subscription_state(
        pool: &DbPool,
        account_id: DbId,
        plan: Option<PlanTier>,
        status: SubscriptionStatus,
        period_end: Option<Timestamp>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET plan = COALESCE($2, plan),
                subscription_status = $3,
                current_period_end = COALESCE($4, current_period_end)
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(plan.map(|p| p.as_str()))
        .bind(status.as_str())
        .bind(period_end)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Subscription ended: back to the free tier and its allotment.
    pub async fn apply_cancellation(pool: &DbPool, account_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET plan = 'free',
                credits_remaining = $2,
                subscription_status = 'cancelled',
                billing_subscription_ref = NULL,
                current_period_end = NULL
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(PlanTier::Free.monthly_credits())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A failed payment: flag the account, keep the balance untouched.
    pub async fn mark_past_due(pool: &DbPool, account_id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE accounts SET subscription_status = 'past_due' WHERE id = $1")
                .bind(account_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
