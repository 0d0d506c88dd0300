//! Repository for account rows.

use flyerforge_core::types::DbId;

use crate::models::account::{Account, CreateAccount, UpdateAccountProfile};
use crate::DbPool;

/// Column list shared by every query returning a full account row.
const COLUMNS: &str = "id, email, password_hash, display_name, phone, company_name, portrait_url, \
                       plan, credits_remaining, subscription_status, billing_customer_ref, \
                       billing_subscription_ref, current_period_end, created_at, updated_at";

pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account. Plan and credit balance start at the
    /// free-tier defaults declared in the schema.
    pub async fn create(pool: &DbPool, data: &CreateAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO accounts (email, password_hash, display_name)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "#
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(&data.display_name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE email = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Look an account up by the billing provider's customer reference.
    pub async fn find_by_customer_ref(
        pool: &DbPool,
        customer_ref: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE billing_customer_ref = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(customer_ref)
            .fetch_optional(pool)
            .await
    }

    /// Partial profile update; absent fields keep their stored value.
    pub async fn update_profile(
        pool: &DbPool,
        id: DbId,
        data: &UpdateAccountProfile,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE accounts
            SET display_name = COALESCE($2, display_name),
                phone = COALESCE($3, phone),
                company_name = COALESCE($4, company_name)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(&data.display_name)
            .bind(&data.phone)
            .bind(&data.company_name)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_portrait_url(
        pool: &DbPool,
        id: DbId,
        portrait_url: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE accounts
            SET portrait_url = $2
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(portrait_url)
            .fetch_optional(pool)
            .await
    }
}
