//! HTTP client for the Gemini image generation API.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use flyerforge_core::image_ref::ImageRef;
use flyerforge_core::prompt::CompiledPrompt;

use crate::api::{first_image, GenerateContentRequest, Content, Part};
use crate::{GeneratedFlyer, ImageGenerator, ProviderError};

/// Generation provider settings.
///
/// | Variable | Required | Default | Description |
/// |----------|----------|---------|-------------|
/// | `GEMINI_API_KEY` | yes | - | API key sent as `x-goog-api-key` |
/// | `GEMINI_MODEL` | no | `gemini-3-pro-image-preview` | Image-capable model name |
/// | `GEMINI_BASE_URL` | no | `https://generativelanguage.googleapis.com` | API host override for proxies |
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    /// Load from environment variables, panicking on a missing API key so
    /// misconfiguration surfaces at startup.
    pub fn from_env() -> Self {
        GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set"),
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-3-pro-image-preview".to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
        }
    }
}

/// HTTP client for one Gemini project key.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    // ---- private helpers ----

    /// Turn one attachment into an inline request part, fetching remote
    /// references first. The endpoint only accepts inline image data, so
    /// stored URLs are re-inlined here at the provider boundary.
    async fn resolve_attachment(&self, attachment: &ImageRef) -> Result<Part, ProviderError> {
        match attachment {
            ImageRef::Inline { data, mime_type } => Ok(Part::inline(mime_type, data)),
            ImageRef::Remote { url } => self.fetch_inline(url).await,
        }
    }

    async fn fetch_inline(&self, url: &str) -> Result<Part, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Attachment {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Attachment {
                url: url.to_string(),
                message: format!("status {}", response.status()),
            });
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
            .unwrap_or_else(|| "image/jpeg".to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Attachment {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Part::inline(mime_type, BASE64.encode(&bytes)))
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, prompt: &CompiledPrompt) -> Result<GeneratedFlyer, ProviderError> {
        let mut parts = Vec::with_capacity(prompt.attachments.len() + 1);
        parts.push(Part::text(&prompt.instruction));
        for attachment in &prompt.attachments {
            parts.push(self.resolve_attachment(attachment).await?);
        }

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        tracing::debug!(
            model = %self.config.model,
            attachments = prompt.attachments.len(),
            "submitting generation request"
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let body: crate::api::GenerateContentResponse = response.json().await?;
        let image = first_image(&body).ok_or(ProviderError::NoImage)?;

        Ok(GeneratedFlyer {
            data: image.data.clone(),
            mime_type: image.mime_type.clone(),
        })
    }
}
