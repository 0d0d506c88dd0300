//! Authenticated-request extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use flyerforge_core::types::DbId;
use flyerforge_core::CoreError;

use crate::auth::jwt;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated account, extracted from the `Authorization` header.
///
/// Handlers take this as an argument to require a valid bearer token;
/// extraction failure short-circuits with a 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })?;

        let claims = jwt::validate_token(&state.config.jwt, token)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        Ok(AuthUser {
            account_id: claims.sub,
        })
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}
