//! S3-compatible object store implementation.

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::{DeleteReport, ObjectStore, StorageError};

/// S3 connection settings.
///
/// | Variable | Required | Default | Description |
/// |----------|----------|---------|-------------|
/// | `S3_BUCKET` | yes | - | Bucket holding all image assets |
/// | `S3_REGION` | no | `us-east-1` | Bucket region |
/// | `S3_ENDPOINT` | no | - | Custom endpoint for S3-compatible stores (MinIO etc.) |
/// | `S3_ACCESS_KEY_ID` | no | - | Static credentials; default AWS chain when unset |
/// | `S3_SECRET_ACCESS_KEY` | no | - | Static credentials; default AWS chain when unset |
/// | `S3_PUBLIC_BASE_URL` | no | `https://{bucket}.s3.amazonaws.com` | Base for public URLs, supports `{bucket}`/`{key}` templating |
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub public_base_url: String,
}

impl S3Config {
    /// Load from environment variables, panicking on missing required
    /// values so misconfiguration surfaces at startup.
    pub fn from_env() -> Self {
        let bucket = std::env::var("S3_BUCKET").expect("S3_BUCKET must be set");
        let public_base_url = std::env::var("S3_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("https://{bucket}.s3.amazonaws.com"));
        S3Config {
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint: std::env::var("S3_ENDPOINT").ok(),
            access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok(),
            secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").ok(),
            bucket,
            public_base_url,
        }
    }
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    /// Build a client from the given settings.
    pub async fn connect(config: S3Config) -> Self {
        let region_provider =
            RegionProviderChain::first_try(Region::new(config.region.clone())).or_else("us-east-1");
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
        if let (Some(key), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader
                .credentials_provider(Credentials::new(key, secret, None, None, "flyerforge-env"));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        // Custom S3-compatible endpoints (MinIO, Beget) need path-style keys.
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::with_client(
            Client::from_conf(builder.build()),
            config.bucket,
            config.public_base_url,
        )
    }

    pub fn with_client(client: Client, bucket: String, public_base_url: String) -> Self {
        S3ObjectStore {
            client,
            bucket,
            public_base_url,
        }
    }

    fn public_url(&self, key: &str) -> String {
        build_public_url(&self.public_base_url, &self.bucket, key)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .cache_control("max-age=3600")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(self.public_url(key))
    }

    async fn delete_batch(&self, keys: &[String]) -> DeleteReport {
        let mut report = DeleteReport::default();
        for key in keys {
            let result = self
                .client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await;
            match result {
                Ok(_) => report.deleted.push(key.clone()),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "object delete failed");
                    report.failed.push(key.clone());
                }
            }
        }
        report
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        let prefix = self.public_url("");
        url.strip_prefix(&prefix)
            .filter(|key| !key.is_empty())
            .map(|key| key.to_string())
    }
}

/// Build the public URL for an object key.
///
/// Supports three base shapes: explicit `{bucket}`/`{key}` templating, a
/// base that already contains the bucket (virtual-hosted style), and a
/// bare host that needs the bucket appended (path style).
fn build_public_url(base: &str, bucket: &str, key: &str) -> String {
    let trimmed = base.trim_end_matches('/');

    if trimmed.contains("{bucket}") || trimmed.contains("{key}") {
        return trimmed.replace("{bucket}", bucket).replace("{key}", key);
    }

    if trimmed.contains(bucket) {
        format!("{trimmed}/{key}")
    } else {
        format!("{trimmed}/{bucket}/{key}")
    }
}
