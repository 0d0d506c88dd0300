//! Repository for property image rows.

use flyerforge_core::types::DbId;

use crate::models::project_image::{CreateProjectImage, ProjectImage};
use crate::DbPool;

/// Column list shared by every query returning a full property image row.
const COLUMNS: &str =
    "id, project_id, remote_url, inline_data, mime_type, upload_order, created_at, updated_at";

pub struct ProjectImageRepo;

impl ProjectImageRepo {
    pub async fn create(
        pool: &DbPool,
        data: &CreateProjectImage,
    ) -> Result<ProjectImage, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO project_images (project_id, remote_url, inline_data, mime_type, upload_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        );
        sqlx::query_as::<_, ProjectImage>(&query)
            .bind(data.project_id)
            .bind(&data.remote_url)
            .bind(&data.inline_data)
            .bind(&data.mime_type)
            .bind(data.upload_order)
            .fetch_one(pool)
            .await
    }

    /// All property images for a project in display order. Position zero
    /// is the hero image.
    pub async fn list_for_project(
        pool: &DbPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_images WHERE project_id = $1 ORDER BY upload_order ASC"
        );
        sqlx::query_as::<_, ProjectImage>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Rewrite display positions to match `ordered_ids`, zero-based.
    ///
    /// Runs in one transaction; the unique (project_id, upload_order)
    /// constraint is deferred, so intermediate states may collide as long
    /// as the final assignment is a permutation. Callers must have
    /// verified that `ordered_ids` covers exactly the project's images.
    pub async fn reorder(
        pool: &DbPool,
        project_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        for (position, image_id) in ordered_ids.iter().enumerate() {
            sqlx::query(
                "UPDATE project_images SET upload_order = $1 WHERE id = $2 AND project_id = $3",
            )
            .bind(position as i32)
            .bind(image_id)
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Object-store URLs referenced by a project's property images.
    pub async fn remote_urls_for_project(
        pool: &DbPool,
        project_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT remote_url FROM project_images \
             WHERE project_id = $1 AND remote_url IS NOT NULL",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
