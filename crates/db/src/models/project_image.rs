//! Property image entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use flyerforge_core::image_ref::ImageRef;
use flyerforge_core::types::{DbId, Timestamp};

/// Full property image row from the `project_images` table.
///
/// Exactly one payload form is populated: `remote_url` when the object
/// store upload succeeded, `inline_data` + `mime_type` when persistence
/// degraded to the inline fallback.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectImage {
    pub id: DbId,
    pub project_id: DbId,
    pub remote_url: Option<String>,
    pub inline_data: Option<String>,
    pub mime_type: Option<String>,
    pub upload_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectImage {
    /// Reassemble the payload reference from the row columns.
    pub fn image(&self) -> ImageRef {
        match &self.remote_url {
            Some(url) => ImageRef::remote(url),
            None => ImageRef::inline(
                self.inline_data.clone().unwrap_or_default(),
                self.mime_type
                    .clone()
                    .unwrap_or_else(|| "image/png".to_string()),
            ),
        }
    }
}

/// Property image representation for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectImageResponse {
    pub id: DbId,
    pub image: ImageRef,
    pub upload_order: i32,
    pub created_at: Timestamp,
}

impl From<ProjectImage> for ProjectImageResponse {
    fn from(row: ProjectImage) -> Self {
        let image = row.image();
        ProjectImageResponse {
            id: row.id,
            image,
            upload_order: row.upload_order,
            created_at: row.created_at,
        }
    }
}

/// DTO for inserting a property image.
#[derive(Debug, Deserialize)]
pub struct CreateProjectImage {
    pub project_id: DbId,
    pub remote_url: Option<String>,
    pub inline_data: Option<String>,
    pub mime_type: Option<String>,
    pub upload_order: i32,
}

/// One row of the latest-result lookup used by the dashboard project list.
#[derive(Debug, Clone, FromRow)]
pub struct LatestProjectImage {
    pub project_id: DbId,
    pub remote_url: Option<String>,
    pub inline_data: Option<String>,
    pub mime_type: Option<String>,
}

impl LatestProjectImage {
    pub fn image(&self) -> ImageRef {
        match &self.remote_url {
            Some(url) => ImageRef::remote(url),
            None => ImageRef::inline(
                self.inline_data.clone().unwrap_or_default(),
                self.mime_type
                    .clone()
                    .unwrap_or_else(|| "image/png".to_string()),
            ),
        }
    }
}
