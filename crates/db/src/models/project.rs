//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use flyerforge_core::types::{DbId, Timestamp};

/// Lifecycle states a project moves through. Stored as text; the CHECK
/// constraint on `projects.status` enforces the same set.
pub const STATUS_GENERATING: &str = "generating";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";

/// Full project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub account_id: DbId,
    pub name: String,
    pub listing_type: String,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_feet: Option<i64>,
    pub property_address: Option<String>,
    pub description: Option<String>,
    pub agent_name: String,
    pub agent_phone: String,
    pub agent_company: Option<String>,
    pub color_scheme: String,
    pub custom_hex: Option<String>,
    pub style: String,
    pub aspect_ratio: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Project representation for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: DbId,
    pub name: String,
    pub listing_type: String,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_feet: Option<i64>,
    pub property_address: Option<String>,
    pub description: Option<String>,
    pub agent_name: String,
    pub agent_phone: String,
    pub agent_company: Option<String>,
    pub color_scheme: String,
    pub custom_hex: Option<String>,
    pub style: String,
    pub aspect_ratio: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        ProjectResponse {
            id: project.id,
            name: project.name,
            listing_type: project.listing_type,
            price: project.price,
            original_price: project.original_price,
            bedrooms: project.bedrooms,
            bathrooms: project.bathrooms,
            square_feet: project.square_feet,
            property_address: project.property_address,
            description: project.description,
            agent_name: project.agent_name,
            agent_phone: project.agent_phone,
            agent_company: project.agent_company,
            color_scheme: project.color_scheme,
            custom_hex: project.custom_hex,
            style: project.style,
            aspect_ratio: project.aspect_ratio,
            status: project.status,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// DTO for creating a new project. Status starts at `generating`.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub account_id: DbId,
    pub name: String,
    pub listing_type: String,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_feet: Option<i64>,
    pub property_address: Option<String>,
    pub description: Option<String>,
    pub agent_name: String,
    pub agent_phone: String,
    pub agent_company: Option<String>,
    pub color_scheme: String,
    pub custom_hex: Option<String>,
    pub style: String,
    pub aspect_ratio: String,
}
