//! Account profile handlers.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use flyerforge_core::image_ref::ImageRef;
use flyerforge_core::CoreError;
use flyerforge_db::models::{AccountResponse, UpdateAccountProfile};
use flyerforge_db::repositories::AccountRepo;
use flyerforge_storage::keys;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PortraitUpload {
    /// Base64 data URL of the portrait image.
    pub data: String,
}

/// GET /api/v1/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let account = AccountRepo::find_by_id(&state.pool, auth.account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id: auth.account_id,
        }))?;

    Ok(Json(DataResponse::new(account.into())))
}

/// PUT /api/v1/me
///
/// Updates only the fields present in the payload.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateAccountProfile>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let account = AccountRepo::update_profile(&state.pool, auth.account_id, &payload)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id: auth.account_id,
        }))?;

    Ok(Json(DataResponse::new(account.into())))
}

/// POST /api/v1/me/portrait
///
/// Validates and stores the agent portrait at a stable per-account key,
/// so re-uploading replaces the previous portrait.
pub async fn upload_portrait(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PortraitUpload>,
) -> AppResult<Json<serde_json::Value>> {
    // 1. Parse and validate the upload.
    let image = ImageRef::parse_payload(&payload.data)?;
    let decoded = image.decode_upload()?;

    // 2. Store it. Portrait upload has no inline fallback; a storage
    //    failure is surfaced to the caller.
    let key = keys::portrait(auth.account_id, keys::extension_for_mime(&decoded.mime_type));
    let url = state.store.put(&key, decoded.bytes, &decoded.mime_type).await?;

    // 3. Record the URL on the account.
    AccountRepo::set_portrait_url(&state.pool, auth.account_id, &url)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id: auth.account_id,
        }))?;

    Ok(Json(json!({ "url": url })))
}
