//! Object storage for image assets.
//!
//! The [`ObjectStore`] trait is the seam between the API and wherever
//! bytes actually land. Uploads return a publicly resolvable URL; deletes
//! are best-effort and report per-key outcomes instead of failing the
//! caller. Callers that cannot tolerate a failed upload fall back to
//! inline persistence, so `put` errors here never have to abort a
//! generation.

pub mod keys;
pub mod s3;

use async_trait::async_trait;

pub use s3::{S3Config, S3ObjectStore};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload failed for key {key}: {message}")]
    Upload { key: String, message: String },

    #[error("Invalid storage configuration: {0}")]
    Config(String),
}

/// Outcome of a best-effort batch delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

impl DeleteReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload an object and return its public URL. Existing objects under
    /// the same key are overwritten.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String, StorageError>;

    /// Delete the given keys, continuing past individual failures.
    async fn delete_batch(&self, keys: &[String]) -> DeleteReport;

    /// Extract the object key from a public URL minted by this store.
    /// Returns `None` for URLs that do not belong to it.
    fn key_for_url(&self, url: &str) -> Option<String>;
}
