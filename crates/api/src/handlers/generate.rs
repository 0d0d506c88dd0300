//! Flyer generation handlers.
//!
//! The workflow is: credit gate, persist inputs, compile the prompt, call
//! the provider, persist the result, settle. The credit is debited only
//! inside the settle transaction together with the artifact insert, so a
//! failure anywhere earlier leaves the balance untouched and parks the
//! project in `failed` as an audit row.

use axum::extract::{Path, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::json;

use flyerforge_core::flyer::{AspectRatio, ColorScheme, FlyerParams, FlyerStyle, ListingType};
use flyerforge_core::image_ref::{DecodedImage, ImageRef};
use flyerforge_core::prompt;
use flyerforge_core::types::DbId;
use flyerforge_core::CoreError;
use flyerforge_db::models::{
    Account, CreateGeneratedImage, CreateProject, CreateProjectImage, Project, STATUS_FAILED,
};
use flyerforge_db::repositories::{AccountRepo, CreditLedger, ProjectImageRepo, ProjectRepo};
use flyerforge_gemini::GeneratedFlyer;
use flyerforge_storage::keys;

use crate::error::{AppError, AppResult};
use crate::handlers::projects::find_owned;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub listing_type: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub original_price: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<f64>,
    #[serde(default)]
    pub square_feet: Option<i64>,
    #[serde(default)]
    pub property_address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub agent_phone: Option<String>,
    #[serde(default)]
    pub agent_company: Option<String>,
    #[serde(default)]
    pub color_scheme: Option<String>,
    #[serde(default)]
    pub custom_hex: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    /// Property image payloads: data URLs, bare base64, or https URLs.
    #[serde(default)]
    pub property_images: Vec<String>,
    /// Optional portrait payload, forwarded to the provider but not stored.
    #[serde(default)]
    pub agent_portrait: Option<String>,
}

/// Overrides for a re-run. Every field is optional; anything absent keeps
/// the value stored on the project.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateRequest {
    pub listing_type: Option<String>,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<i64>,
    pub property_address: Option<String>,
    pub description: Option<String>,
    pub agent_name: Option<String>,
    pub agent_phone: Option<String>,
    pub agent_company: Option<String>,
    pub color_scheme: Option<String>,
    pub custom_hex: Option<String>,
    pub style: Option<String>,
    pub aspect_ratio: Option<String>,
}

/// A validated property image ready for persistence. Inline payloads are
/// decoded once up front; remote references carry no bytes.
struct PropertyUpload {
    image: ImageRef,
    decoded: Option<DecodedImage>,
}

/// POST /api/v1/projects/generate
pub async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<GenerateRequest>,
) -> AppResult<Json<serde_json::Value>> {
    // 1. Load the account; profile fields backfill missing agent info.
    let account = AccountRepo::find_by_id(&state.pool, auth.account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id: auth.account_id,
        }))?;

    // 2. Parse and validate the full parameter set.
    let params = build_params(&payload, &account)?;

    // 3. Validate image payloads before anything is persisted, so a bad
    //    upload fails with a 400 and no project row.
    let uploads = parse_property_images(&payload.property_images)?;
    let portrait = payload
        .agent_portrait
        .as_deref()
        .map(parse_portrait)
        .transpose()?;

    // 4. Credit gate. This only checks; nothing is reserved.
    ensure_credit(&state, auth.account_id).await?;

    // 5. Create the project shell in `generating` state.
    let project = ProjectRepo::create(
        &state.pool,
        &create_project(auth.account_id, project_name(&params), &params),
    )
    .await?;

    // 6. From here on a failure parks the project in `failed`.
    match run_generation(&state, account.id, &project, &params, &uploads, portrait.as_ref()).await {
        Ok(image_id) => Ok(Json(json!({
            "success": true,
            "projectId": project.id,
            "imageId": image_id,
        }))),
        Err(error) => {
            mark_failed(&state, project.id).await;
            Err(error)
        }
    }
}

/// POST /api/v1/projects/{id}/regenerate
///
/// Re-runs generation for an existing project using its stored images and
/// parameters, with optional one-off overrides. Overrides are not written
/// back to the project; only the result snapshot records them.
pub async fn regenerate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    payload: Option<Json<RegenerateRequest>>,
) -> AppResult<Json<serde_json::Value>> {
    let overrides = payload.map(|Json(p)| p).unwrap_or_default();

    // 1. Account and owned project. A miss is a 404 either way.
    let account = AccountRepo::find_by_id(&state.pool, auth.account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id: auth.account_id,
        }))?;
    let project = find_owned(&state, id, auth.account_id).await?;

    // 2. Credit gate.
    ensure_credit(&state, auth.account_id).await?;

    // 3. Rebuild the parameter set from the stored project, overrides on top.
    let params = merge_params(&project, &account, &overrides)?;

    // 4. Stored images ride along as references; the provider client
    //    re-inlines remote ones. The profile portrait is used if present.
    let stored = ProjectImageRepo::list_for_project(&state.pool, project.id).await?;
    let property_refs: Vec<ImageRef> = stored.iter().map(|row| row.image()).collect();
    let portrait = account.portrait_url.as_deref().map(ImageRef::remote);

    // 5. Generate and settle with the same failure semantics as a fresh run.
    let compiled = prompt::compile(&params, &property_refs, portrait.as_ref());
    let result = async {
        let flyer = state.generator.generate(&compiled).await?;
        finalize(&state, auth.account_id, project.id, &params, &flyer).await
    }
    .await;

    match result {
        Ok(image_id) => Ok(Json(json!({
            "success": true,
            "projectId": project.id,
            "imageId": image_id,
        }))),
        Err(error) => {
            mark_failed(&state, project.id).await;
            Err(error)
        }
    }
}

// ---- private helpers ----

/// Persist the inputs, call the provider, persist the output, settle.
async fn run_generation(
    state: &AppState,
    account_id: DbId,
    project: &Project,
    params: &FlyerParams,
    uploads: &[PropertyUpload],
    portrait: Option<&ImageRef>,
) -> Result<DbId, AppError> {
    // Persist property images concurrently. Display order is upload order.
    let writes = uploads.iter().enumerate().map(|(position, upload)| {
        persist_property_image(state, project.id, position as i32, upload)
    });
    try_join_all(writes).await?;

    // The provider gets the caller's original payloads; re-reading what
    // was just stored would only add a round trip.
    let property_refs: Vec<ImageRef> = uploads.iter().map(|u| u.image.clone()).collect();
    let compiled = prompt::compile(params, &property_refs, portrait);
    let flyer = state.generator.generate(&compiled).await?;

    finalize(state, account_id, project.id, params, &flyer).await
}

/// Store one property image row. Inline payloads are uploaded to the
/// object store; if that fails the image degrades to inline persistence
/// in the database instead of failing the whole request.
async fn persist_property_image(
    state: &AppState,
    project_id: DbId,
    position: i32,
    upload: &PropertyUpload,
) -> Result<(), AppError> {
    let row = match (&upload.image, &upload.decoded) {
        (ImageRef::Remote { url }, _) => CreateProjectImage {
            project_id,
            remote_url: Some(url.clone()),
            inline_data: None,
            mime_type: None,
            upload_order: position,
        },
        (ImageRef::Inline { data, mime_type }, Some(decoded)) => {
            let key = keys::property_image(project_id, keys::extension_for_mime(mime_type));
            match state.store.put(&key, decoded.bytes.clone(), mime_type).await {
                Ok(url) => CreateProjectImage {
                    project_id,
                    remote_url: Some(url),
                    inline_data: None,
                    mime_type: None,
                    upload_order: position,
                },
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        project_id,
                        position,
                        "property image upload failed, persisting inline"
                    );
                    CreateProjectImage {
                        project_id,
                        remote_url: None,
                        inline_data: Some(data.clone()),
                        mime_type: Some(mime_type.clone()),
                        upload_order: position,
                    }
                }
            }
        }
        // Inline uploads always carry decoded bytes from parsing.
        (ImageRef::Inline { .. }, None) => {
            return Err(AppError::InternalError(
                "Inline image missing decoded payload".to_string(),
            ))
        }
    };

    ProjectImageRepo::create(&state.pool, &row).await?;
    Ok(())
}

/// Persist the generated flyer and settle atomically: artifact insert,
/// project completion, credit debit. A lost credit race surfaces as 402.
async fn finalize(
    state: &AppState,
    account_id: DbId,
    project_id: DbId,
    params: &FlyerParams,
    flyer: &GeneratedFlyer,
) -> Result<DbId, AppError> {
    let (remote_url, inline_data) = persist_result(state, account_id, project_id, flyer).await;

    let artifact = CreateGeneratedImage {
        project_id,
        account_id,
        remote_url,
        inline_data,
        mime_type: flyer.mime_type.clone(),
        params: serde_json::to_value(params)
            .map_err(|e| AppError::InternalError(format!("Params serialization failed: {e}")))?,
    };

    let image = CreditLedger::finalize_generation(&state.pool, &artifact)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::PaymentRequired(
                "No credits remaining. Please upgrade your plan.".to_string(),
            ))
        })?;

    Ok(image.id)
}

/// Upload the flyer to the object store, falling back to inline data on
/// any failure. Returns `(remote_url, inline_data)`, exactly one set.
async fn persist_result(
    state: &AppState,
    account_id: DbId,
    project_id: DbId,
    flyer: &GeneratedFlyer,
) -> (Option<String>, Option<String>) {
    let bytes = match BASE64.decode(&flyer.data) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(error = %error, project_id, "flyer payload not decodable, persisting inline");
            return (None, Some(flyer.data.clone()));
        }
    };

    let key = keys::generated_flyer(
        account_id,
        project_id,
        keys::extension_for_mime(&flyer.mime_type),
    );
    match state.store.put(&key, bytes, &flyer.mime_type).await {
        Ok(url) => (Some(url), None),
        Err(error) => {
            tracing::warn!(
                error = %error,
                project_id,
                "flyer upload failed, persisting inline"
            );
            (None, Some(flyer.data.clone()))
        }
    }
}

async fn ensure_credit(state: &AppState, account_id: DbId) -> Result<(), AppError> {
    if !CreditLedger::has_available_credit(&state.pool, account_id).await? {
        return Err(AppError::Core(CoreError::PaymentRequired(
            "No credits remaining. Please upgrade your plan.".to_string(),
        )));
    }
    Ok(())
}

/// Park the project in `failed`. Called on error paths, so this never
/// overrides the original error.
async fn mark_failed(state: &AppState, project_id: DbId) {
    if let Err(error) = ProjectRepo::update_status(&state.pool, project_id, STATUS_FAILED).await {
        tracing::error!(error = %error, project_id, "could not mark project failed");
    }
}

/// Parse and validate property image payloads. Inline payloads are
/// decoded and size/type checked here; remote URLs pass through.
fn parse_property_images(payloads: &[String]) -> Result<Vec<PropertyUpload>, AppError> {
    payloads
        .iter()
        .map(|payload| {
            let image = ImageRef::parse_payload(payload)?;
            let decoded = match &image {
                ImageRef::Inline { .. } => Some(image.decode_upload()?),
                ImageRef::Remote { .. } => None,
            };
            Ok(PropertyUpload { image, decoded })
        })
        .collect()
}

/// Parse the portrait payload. Inline portraits get the same validation
/// as uploads; remote ones pass through for the provider to fetch.
fn parse_portrait(payload: &str) -> Result<ImageRef, AppError> {
    let image = ImageRef::parse_payload(payload)?;
    if matches!(image, ImageRef::Inline { .. }) {
        image.decode_upload()?;
    }
    Ok(image)
}

fn build_params(payload: &GenerateRequest, account: &Account) -> Result<FlyerParams, AppError> {
    let listing_type: ListingType = payload.listing_type.parse()?;
    let color_scheme = match payload.color_scheme.as_deref() {
        Some(value) => value.parse()?,
        None => ColorScheme::Navy,
    };
    let style = match payload.style.as_deref() {
        Some(value) => value.parse()?,
        None => FlyerStyle::Modern,
    };
    let aspect_ratio = match payload.aspect_ratio.as_deref() {
        Some(value) => value.parse()?,
        None => AspectRatio::Square,
    };

    let agent_name = resolve(payload.agent_name.as_deref(), account.display_name.as_deref());
    let agent_phone = resolve(payload.agent_phone.as_deref(), account.phone.as_deref());
    if agent_name.is_empty() || agent_phone.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Missing required fields".to_string(),
        )));
    }
    let agent_company = clean(payload.agent_company.as_deref())
        .or_else(|| clean(account.company_name.as_deref()));

    Ok(FlyerParams {
        listing_type,
        price: clean(payload.price.as_deref()),
        original_price: clean(payload.original_price.as_deref()),
        bedrooms: payload.bedrooms.unwrap_or(0),
        bathrooms: payload.bathrooms.unwrap_or(0.0),
        square_feet: payload.square_feet,
        property_address: clean(payload.property_address.as_deref()),
        description: clean(payload.description.as_deref()),
        agent_name,
        agent_phone,
        agent_company,
        color_scheme,
        custom_hex: clean(payload.custom_hex.as_deref()),
        style,
        aspect_ratio,
    })
}

/// Rebuild parameters from a stored project, with overrides on top.
/// Stored values were validated at creation, so a parse failure there is
/// an internal error, not the caller's.
fn merge_params(
    project: &Project,
    account: &Account,
    overrides: &RegenerateRequest,
) -> Result<FlyerParams, AppError> {
    let listing_type = match overrides.listing_type.as_deref() {
        Some(value) => value.parse()?,
        None => stored_parse::<ListingType>(&project.listing_type)?,
    };
    let color_scheme = match overrides.color_scheme.as_deref() {
        Some(value) => value.parse()?,
        None => stored_parse::<ColorScheme>(&project.color_scheme)?,
    };
    let style = match overrides.style.as_deref() {
        Some(value) => value.parse()?,
        None => stored_parse::<FlyerStyle>(&project.style)?,
    };
    let aspect_ratio = match overrides.aspect_ratio.as_deref() {
        Some(value) => value.parse()?,
        None => stored_parse::<AspectRatio>(&project.aspect_ratio)?,
    };

    let agent_name = resolve(
        overrides.agent_name.as_deref(),
        Some(&project.agent_name),
    );
    let agent_phone = resolve(
        overrides.agent_phone.as_deref(),
        Some(&project.agent_phone),
    );
    if agent_name.is_empty() || agent_phone.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Missing required fields".to_string(),
        )));
    }
    let agent_company = clean(overrides.agent_company.as_deref())
        .or_else(|| project.agent_company.clone())
        .or_else(|| clean(account.company_name.as_deref()));

    Ok(FlyerParams {
        listing_type,
        price: clean(overrides.price.as_deref()).or_else(|| project.price.clone()),
        original_price: clean(overrides.original_price.as_deref())
            .or_else(|| project.original_price.clone()),
        bedrooms: overrides.bedrooms.unwrap_or(project.bedrooms),
        bathrooms: overrides.bathrooms.unwrap_or(project.bathrooms),
        square_feet: overrides.square_feet.or(project.square_feet),
        property_address: clean(overrides.property_address.as_deref())
            .or_else(|| project.property_address.clone()),
        description: clean(overrides.description.as_deref())
            .or_else(|| project.description.clone()),
        agent_name,
        agent_phone,
        agent_company,
        color_scheme,
        custom_hex: clean(overrides.custom_hex.as_deref())
            .or_else(|| project.custom_hex.clone()),
        style,
        aspect_ratio,
    })
}

fn stored_parse<T: std::str::FromStr<Err = CoreError>>(value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::InternalError(format!("Stored parameter invalid: {value}")))
}

/// First non-empty value wins, trimmed.
fn resolve(primary: Option<&str>, fallback: Option<&str>) -> String {
    clean(primary)
        .or_else(|| clean(fallback))
        .unwrap_or_default()
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Display name for a fresh project, derived from the listing.
fn project_name(params: &FlyerParams) -> String {
    match &params.price {
        Some(price) => format!("{} - ${price}", params.listing_type.as_str()),
        None => params.listing_type.as_str().to_string(),
    }
}

fn create_project(account_id: DbId, name: String, params: &FlyerParams) -> CreateProject {
    CreateProject {
        account_id,
        name,
        listing_type: params.listing_type.as_str().to_string(),
        price: params.price.clone(),
        original_price: params.original_price.clone(),
        bedrooms: params.bedrooms,
        bathrooms: params.bathrooms,
        square_feet: params.square_feet,
        property_address: params.property_address.clone(),
        description: params.description.clone(),
        agent_name: params.agent_name.clone(),
        agent_phone: params.agent_phone.clone(),
        agent_company: params.agent_company.clone(),
        color_scheme: params.color_scheme.as_str().to_string(),
        custom_hex: params.custom_hex.clone(),
        style: params.style.as_str().to_string(),
        aspect_ratio: params.aspect_ratio.as_str().to_string(),
    }
}
