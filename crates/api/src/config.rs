//! Server configuration loaded from environment variables.

use crate::auth::jwt::JwtConfig;

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub host: String,
    /// Port the HTTP listener binds to.
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
    /// Per-request timeout enforced by the middleware stack.
    pub request_timeout_secs: u64,
    /// Shared secret for billing webhook signatures.
    pub billing_webhook_secret: String,
    /// Token signing settings.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Required | Default | Description |
    /// |----------|----------|---------|-------------|
    /// | `HOST` | no | `0.0.0.0` | Listen address |
    /// | `PORT` | no | `3000` | Listen port |
    /// | `CORS_ORIGINS` | no | `http://localhost:5173` | Comma-separated allowed origins |
    /// | `REQUEST_TIMEOUT_SECS` | no | `30` | Request timeout in seconds |
    /// | `BILLING_WEBHOOK_SECRET` | yes | - | HMAC secret for billing webhooks |
    ///
    /// JWT variables are documented on [`JwtConfig::from_env`].
    ///
    /// Panics if a required variable is missing or a value fails to parse.
    /// Configuration errors should stop the process before it accepts
    /// traffic.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .expect("PORT must be a valid port number");

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a number");

        let billing_webhook_secret =
            std::env::var("BILLING_WEBHOOK_SECRET").expect("BILLING_WEBHOOK_SECRET must be set");

        ServerConfig {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            billing_webhook_secret,
            jwt: JwtConfig::from_env(),
        }
    }
}
