//! API error types and their mapping onto HTTP responses.
//!
//! Every error leaves the server as `{"error": "<message>"}` with an
//! appropriate status code. Internal detail (database errors, provider
//! bodies, storage failures) is logged and replaced with a generic
//! message before it reaches the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use flyerforge_core::CoreError;
use flyerforge_gemini::ProviderError;
use flyerforge_storage::StorageError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Core(error) => core_error_response(error),
            AppError::Database(error) => classify_sqlx_error(error),
            AppError::Provider(error) => {
                tracing::error!(error = %error, "image generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate image with AI".to_string(),
                )
            }
            AppError::Storage(error) => {
                tracing::error!(error = %error, "storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to upload image".to_string(),
                )
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::InternalError(message) => {
                tracing::error!(error = %message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Map domain errors to status codes, passing their messages through.
fn core_error_response(error: CoreError) -> (StatusCode, String) {
    match error {
        CoreError::NotFound { entity, .. } => (StatusCode::NOT_FOUND, format!("{entity} not found")),
        CoreError::Validation(message) => (StatusCode::BAD_REQUEST, message),
        CoreError::Conflict(message) => (StatusCode::CONFLICT, message),
        CoreError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
        CoreError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
        CoreError::PaymentRequired(message) => (StatusCode::PAYMENT_REQUIRED, message),
        CoreError::Internal(message) => {
            tracing::error!(error = %message, "internal domain error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Classify database errors into client-facing responses.
///
/// Unique violations on `uq_`-prefixed constraints become 409s, since
/// those constraints guard caller-visible uniqueness (emails, billing
/// event ids). Everything else is logged and sanitized to a 500.
fn classify_sqlx_error(error: sqlx::Error) -> (StatusCode, String) {
    match &error {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
        sqlx::Error::Database(db_error) => {
            if db_error.code().as_deref() == Some("23505") {
                if let Some(constraint) = db_error.constraint() {
                    if constraint.starts_with("uq_") {
                        return (
                            StatusCode::CONFLICT,
                            format!("Duplicate value violates unique constraint: {constraint}"),
                        );
                    }
                }
            }
            tracing::error!(error = %error, "database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            )
        }
        _ => {
            tracing::error!(error = %error, "database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404_with_entity_name() {
        let (status, message) = core_error_response(CoreError::NotFound {
            entity: "Project",
            id: 42,
        });
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Project not found");
    }

    #[test]
    fn test_payment_required_maps_to_402() {
        let (status, message) = core_error_response(CoreError::PaymentRequired(
            "No credits remaining. Please upgrade your plan.".to_string(),
        ));
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(message, "No credits remaining. Please upgrade your plan.");
    }

    #[test]
    fn test_internal_message_is_sanitized() {
        let (status, message) =
            core_error_response(CoreError::Internal("secret detail".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "An internal error occurred");
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let (status, _) = classify_sqlx_error(sqlx::Error::RowNotFound);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
