//! Image payload references.
//!
//! An [`ImageRef`] is either a remote URL (the normal case once an object
//! store upload succeeded) or an inline base64 payload (caller uploads and
//! the degraded-storage fallback). The two forms are kept explicit so that
//! every site that persists, serves, or forwards an image states which one
//! it is handling.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Hard cap on decoded upload size.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted for uploads.
pub const ALLOWED_UPLOAD_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

static DATA_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:([^;]+);base64,(.+)$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ImageRef {
    /// Base64 payload carried in the database row or request body.
    #[serde(rename = "inline")]
    Inline { data: String, mime_type: String },
    /// Publicly resolvable URL minted by the object store.
    #[serde(rename = "remote")]
    Remote { url: String },
}

impl ImageRef {
    pub fn inline(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        ImageRef::Inline {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        ImageRef::Remote { url: url.into() }
    }

    /// Parse a caller-supplied payload string.
    ///
    /// Accepts an `http(s)` URL, a base64 data URL, or a bare base64 string
    /// (assumed PNG, matching what browsers produce from a canvas without a
    /// header).
    pub fn parse_payload(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Empty image payload".into()));
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Ok(ImageRef::remote(trimmed));
        }
        if let Some(caps) = DATA_URL_RE.captures(trimmed) {
            return Ok(ImageRef::inline(&caps[2], &caps[1]));
        }
        // No data URL header. Reject anything that cannot be base64 rather
        // than storing garbage.
        if BASE64.decode(trimmed).is_err() {
            return Err(CoreError::Validation(
                "Invalid image format. Must be a base64 data URL.".into(),
            ));
        }
        Ok(ImageRef::inline(trimmed, "image/png"))
    }

    pub fn remote_url(&self) -> Option<&str> {
        match self {
            ImageRef::Remote { url } => Some(url),
            ImageRef::Inline { .. } => None,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            ImageRef::Inline { mime_type, .. } => Some(mime_type),
            ImageRef::Remote { .. } => None,
        }
    }

    /// Decode an inline payload and check it against the upload policy:
    /// allow-listed content type, size cap, and magic bytes that match the
    /// declared type.
    pub fn decode_upload(&self) -> Result<DecodedImage, CoreError> {
        let (data, mime_type) = match self {
            ImageRef::Inline { data, mime_type } => (data, mime_type),
            ImageRef::Remote { .. } => {
                return Err(CoreError::Validation(
                    "Invalid image format. Must be a base64 data URL.".into(),
                ))
            }
        };

        if !ALLOWED_UPLOAD_TYPES.contains(&mime_type.as_str()) {
            return Err(CoreError::Validation(format!(
                "Invalid file type: {mime_type}. Only JPEG, PNG, and WebP are allowed."
            )));
        }

        let bytes = BASE64.decode(data).map_err(|_| {
            CoreError::Validation("Invalid image format. Must be a base64 data URL.".into())
        })?;

        if bytes.len() > MAX_UPLOAD_BYTES {
            let megabytes = bytes.len() as f64 / (1024.0 * 1024.0);
            return Err(CoreError::Validation(format!(
                "File too large: {megabytes:.2}MB. Maximum allowed is 5MB."
            )));
        }

        let sniffed = image::guess_format(&bytes)
            .map(|format| format.to_mime_type())
            .map_err(|_| {
                CoreError::Validation(format!(
                    "Invalid file type: {mime_type}. Only JPEG, PNG, and WebP are allowed."
                ))
            })?;
        if sniffed != mime_type {
            return Err(CoreError::Validation(format!(
                "Image data does not match declared type {mime_type}"
            )));
        }

        Ok(DecodedImage {
            bytes,
            mime_type: mime_type.clone(),
        })
    }
}

/// An inline payload that passed the upload policy.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}
