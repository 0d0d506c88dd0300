//! Repository for generated flyer rows.
//!
//! Inserts do not live here: a generation result is only persisted by
//! [`crate::repositories::CreditLedger::finalize_generation`], which ties
//! the insert to the status flip and the credit decrement.

use flyerforge_core::types::DbId;

use crate::models::generated_image::GeneratedImage;
use crate::models::project_image::LatestProjectImage;
use crate::DbPool;

/// Column list shared by every query returning a full generated flyer row.
const COLUMNS: &str = "id, project_id, account_id, remote_url, inline_data, mime_type, params, \
                       created_at, updated_at";

pub struct GeneratedImageRepo;

impl GeneratedImageRepo {
    /// All results for a project, newest first. The first element is the
    /// project's current display image.
    pub async fn list_for_project(
        pool: &DbPool,
        project_id: DbId,
    ) -> Result<Vec<GeneratedImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_images \
             WHERE project_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Newest result per project for one account. Feeds the dashboard
    /// project list.
    pub async fn latest_for_account(
        pool: &DbPool,
        account_id: DbId,
    ) -> Result<Vec<LatestProjectImage>, sqlx::Error> {
        sqlx::query_as::<_, LatestProjectImage>(
            "SELECT DISTINCT ON (project_id) project_id, remote_url, inline_data, mime_type \
             FROM generated_images \
             WHERE account_id = $1 \
             ORDER BY project_id, created_at DESC, id DESC",
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }

    /// Object-store URLs referenced by a project's generated flyers.
    pub async fn remote_urls_for_project(
        pool: &DbPool,
        project_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT remote_url FROM generated_images \
             WHERE project_id = $1 AND remote_url IS NOT NULL",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
