//! Access token issuing and validation (HS256).

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use flyerforge_core::types::DbId;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id the token was issued for.
    pub sub: DbId,
    /// Expiry, unix seconds.
    pub exp: i64,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Unique token id.
    pub jti: String,
}

/// Token signing settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Load JWT settings from environment variables.
    ///
    /// | Variable | Required | Default | Description |
    /// |----------|----------|---------|-------------|
    /// | `JWT_SECRET` | yes | - | HS256 signing secret, must be non-empty |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no | `60` | Access token lifetime in minutes |
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a number");

        JwtConfig {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Issue a signed access token for an account.
pub fn generate_access_token(
    config: &JwtConfig,
    account_id: DbId,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: account_id,
        exp: (now + chrono::Duration::minutes(config.access_token_expiry_mins)).timestamp(),
        iat: now.timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a token's signature and expiry, returning its claims.
///
/// Allows 60 seconds of clock skew on expiry.
pub fn validate_token(config: &JwtConfig, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 60;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}
