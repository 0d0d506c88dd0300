//! Project read, delete, and image-order handlers.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use flyerforge_core::image_ref::ImageRef;
use flyerforge_core::types::DbId;
use flyerforge_core::CoreError;
use flyerforge_db::models::{
    GeneratedImageResponse, Project, ProjectImageResponse, ProjectResponse,
};
use flyerforge_db::repositories::{GeneratedImageRepo, ProjectImageRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A project as returned by the list endpoint, with its most recent
/// generated flyer attached for gallery thumbnails.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: ProjectResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<ImageRef>,
}

/// Full project detail: parameters, property images in display order, and
/// all generated flyers newest-first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub property_images: Vec<ProjectImageResponse>,
    pub generated_images: Vec<GeneratedImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub image_ids: Vec<DbId>,
}

/// GET /api/v1/projects
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ProjectSummary>>>> {
    let projects = ProjectRepo::list_for_account(&state.pool, auth.account_id).await?;
    let latest = GeneratedImageRepo::latest_for_account(&state.pool, auth.account_id).await?;

    let mut latest_by_project: HashMap<DbId, ImageRef> = latest
        .into_iter()
        .map(|row| (row.project_id, row.image()))
        .collect();

    let data = projects
        .into_iter()
        .map(|project| {
            let latest_image = latest_by_project.remove(&project.id);
            ProjectSummary {
                project: project.into(),
                latest_image,
            }
        })
        .collect();

    Ok(Json(DataResponse::new(data)))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let project = find_owned(&state, id, auth.account_id).await?;

    let property_images = ProjectImageRepo::list_for_project(&state.pool, project.id)
        .await?
        .into_iter()
        .map(ProjectImageResponse::from)
        .collect();

    let generated_images = GeneratedImageRepo::list_for_project(&state.pool, project.id)
        .await?
        .into_iter()
        .map(GeneratedImageResponse::from)
        .collect();

    Ok(Json(DataResponse::new(ProjectDetail {
        project: project.into(),
        property_images,
        generated_images,
    })))
}

/// DELETE /api/v1/projects/{id}
///
/// The database delete is authoritative; object storage cleanup is
/// best-effort and reported, never a reason to fail the request.
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let project = find_owned(&state, id, auth.account_id).await?;

    // 1. Collect object-store URLs before the rows disappear.
    let mut urls = ProjectImageRepo::remote_urls_for_project(&state.pool, project.id).await?;
    urls.extend(GeneratedImageRepo::remote_urls_for_project(&state.pool, project.id).await?);

    // 2. Delete the project; cascades take property images and results.
    ProjectRepo::delete(&state.pool, project.id).await?;

    // 3. Clean up storage. URLs that do not map back to a key count as
    //    failed so the caller sees the true cleanup state.
    let mut keys = Vec::new();
    let mut unmapped = 0usize;
    for url in urls {
        match state.store.key_for_url(&url) {
            Some(key) => keys.push(key),
            None => unmapped += 1,
        }
    }
    let report = state.store.delete_batch(&keys).await;
    let failed = report.failed.len() + unmapped;
    if failed > 0 {
        tracing::warn!(
            project_id = project.id,
            failed,
            "storage cleanup incomplete after project delete"
        );
    }

    Ok(Json(json!({
        "success": true,
        "storageCleanup": {
            "deleted": report.deleted.len(),
            "failed": failed,
        }
    })))
}

/// PUT /api/v1/projects/{id}/images/order
///
/// The payload must list every image of the project exactly once; the new
/// hero image is whichever id comes first.
pub async fn reorder_images(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(payload): Json<ReorderRequest>,
) -> AppResult<Json<DataResponse<Vec<ProjectImageResponse>>>> {
    let project = find_owned(&state, id, auth.account_id).await?;

    // 1. The ids must be a permutation of the project's current images.
    let current = ProjectImageRepo::list_for_project(&state.pool, project.id).await?;
    let mut expected: Vec<DbId> = current.iter().map(|image| image.id).collect();
    expected.sort_unstable();
    let mut given = payload.image_ids.clone();
    given.sort_unstable();
    if given != expected {
        return Err(AppError::Core(CoreError::Validation(
            "Image ids must match the project's images exactly".to_string(),
        )));
    }

    // 2. Apply the new order in one transaction.
    ProjectImageRepo::reorder(&state.pool, project.id, &payload.image_ids).await?;

    let images = ProjectImageRepo::list_for_project(&state.pool, project.id)
        .await?
        .into_iter()
        .map(ProjectImageResponse::from)
        .collect();

    Ok(Json(DataResponse::new(images)))
}

// ---- private helpers ----

/// Fetch a project scoped to its owner. Missing and not-owned both come
/// back as 404 so ownership is never disclosed.
pub(crate) async fn find_owned(
    state: &AppState,
    project_id: DbId,
    account_id: DbId,
) -> Result<Project, AppError> {
    ProjectRepo::find_owned(&state.pool, project_id, account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))
}
