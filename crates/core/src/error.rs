use crate::types::DbId;

/// Domain-level error taxonomy.
///
/// Transport-specific concerns (HTTP status codes, response bodies) live in
/// the API crate; this enum only captures what went wrong in domain terms.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
