//! Authentication handlers: registration and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use flyerforge_core::CoreError;
use flyerforge_db::models::{Account, AccountResponse, CreateAccount};
use flyerforge_db::repositories::AccountRepo;

use crate::auth::{jwt, password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub account: AccountResponse,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    // 1. Validate input.
    if payload.validate().is_err() {
        return Err(AppError::Core(CoreError::Validation(
            "Invalid email address".to_string(),
        )));
    }
    password::validate_password_strength(&payload.password)?;

    let email = payload.email.trim().to_lowercase();

    // 2. Reject duplicate emails up front. The unique constraint backs
    //    this up under concurrent registration.
    if AccountRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already registered".to_string(),
        )));
    }

    // 3. Hash the password and create the account.
    let password_hash = password::hash_password(&payload.password)?;
    let account = AccountRepo::create(
        &state.pool,
        &CreateAccount {
            email,
            password_hash,
            display_name: payload.display_name,
        },
    )
    .await?;

    // 4. Issue an access token.
    let response = auth_response(&state, account)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = payload.email.trim().to_lowercase();

    // 1. Look the account up. A miss gets the same error as a bad
    //    password so the endpoint does not leak which emails exist.
    let account = AccountRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid_credentials)?;

    // 2. Verify the password.
    if !password::verify_password(&payload.password, &account.password_hash)? {
        return Err(invalid_credentials());
    }

    // 3. Issue an access token.
    let response = auth_response(&state, account)?;
    Ok(Json(response))
}

// ---- private helpers ----

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid email or password".to_string(),
    ))
}

fn auth_response(state: &AppState, account: Account) -> Result<AuthResponse, AppError> {
    let access_token = jwt::generate_access_token(&state.config.jwt, account.id)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    Ok(AuthResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        account: account.into(),
    })
}
