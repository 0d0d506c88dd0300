//! Generated flyer entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use flyerforge_core::image_ref::ImageRef;
use flyerforge_core::types::{DbId, Timestamp};

/// Full generated flyer row from the `generated_images` table.
///
/// `params` is the parameter snapshot the generation actually used, stored
/// verbatim so regeneration and auditing do not depend on later project
/// edits.
#[derive(Debug, Clone, FromRow)]
pub struct GeneratedImage {
    pub id: DbId,
    pub project_id: DbId,
    pub account_id: DbId,
    pub remote_url: Option<String>,
    pub inline_data: Option<String>,
    pub mime_type: String,
    pub params: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl GeneratedImage {
    /// Reassemble the payload reference from the row columns.
    pub fn image(&self) -> ImageRef {
        match &self.remote_url {
            Some(url) => ImageRef::remote(url),
            None => ImageRef::inline(
                self.inline_data.clone().unwrap_or_default(),
                self.mime_type.clone(),
            ),
        }
    }
}

/// Generated flyer representation for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImageResponse {
    pub id: DbId,
    pub project_id: DbId,
    pub image: ImageRef,
    pub mime_type: String,
    pub params: serde_json::Value,
    pub created_at: Timestamp,
}

impl From<GeneratedImage> for GeneratedImageResponse {
    fn from(row: GeneratedImage) -> Self {
        let image = row.image();
        GeneratedImageResponse {
            id: row.id,
            project_id: row.project_id,
            image,
            mime_type: row.mime_type,
            params: row.params,
            created_at: row.created_at,
        }
    }
}

/// DTO for persisting a generation result. Consumed by the ledger's
/// finalize step, which inserts it together with the status flip and the
/// credit decrement.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGeneratedImage {
    pub project_id: DbId,
    pub account_id: DbId,
    pub remote_url: Option<String>,
    pub inline_data: Option<String>,
    pub mime_type: String,
    pub params: serde_json::Value,
}
