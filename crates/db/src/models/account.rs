//! Account entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use flyerforge_core::types::{DbId, Timestamp};

/// Full account row from the `accounts` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`AccountResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub portrait_url: Option<String>,
    pub plan: String,
    pub credits_remaining: i32,
    pub subscription_status: String,
    pub billing_customer_ref: Option<String>,
    pub billing_subscription_ref: Option<String>,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe account representation for API responses (no password hash, no
/// billing provider references).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: DbId,
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub portrait_url: Option<String>,
    pub plan: String,
    pub credits_remaining: i32,
    pub subscription_status: String,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            id: account.id,
            email: account.email,
            display_name: account.display_name,
            phone: account.phone,
            company_name: account.company_name,
            portrait_url: account.portrait_url,
            plan: account.plan,
            credits_remaining: account.credits_remaining,
            subscription_status: account.subscription_status,
            current_period_end: account.current_period_end,
            created_at: account.created_at,
        }
    }
}

/// DTO for creating a new account. The credit balance and plan start at
/// the free-tier defaults declared in the schema.
#[derive(Debug, Deserialize)]
pub struct CreateAccount {
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
}

/// DTO for profile updates. All fields are optional; absent fields keep
/// their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountProfile {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
}
