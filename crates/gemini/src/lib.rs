//! Image generation provider client.
//!
//! The [`ImageGenerator`] trait is the seam the API crate works against;
//! [`client::GeminiClient`] is the real implementation speaking the Gemini
//! `generateContent` REST protocol. A transport failure, a non-2xx status
//! and a well-formed response without an image part are distinct errors so
//! callers can log them apart, even though all of them end a generation
//! attempt.

pub mod api;
pub mod client;

use async_trait::async_trait;

use flyerforge_core::prompt::CompiledPrompt;

pub use client::{GeminiClient, GeminiConfig};

/// Errors from the image generation provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Image provider error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered successfully but no image part was present.
    #[error("Image provider returned no image")]
    NoImage,

    /// A remote attachment could not be fetched for re-inlining.
    #[error("Failed to fetch attachment {url}: {message}")]
    Attachment { url: String, message: String },
}

/// One generated flyer image, base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFlyer {
    pub data: String,
    pub mime_type: String,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Run one generation for a compiled prompt.
    async fn generate(&self, prompt: &CompiledPrompt) -> Result<GeneratedFlyer, ProviderError>;
}
