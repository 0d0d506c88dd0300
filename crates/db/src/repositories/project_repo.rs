//! Repository for project rows.

use flyerforge_core::types::DbId;

use crate::models::project::{CreateProject, Project};
use crate::DbPool;

/// Column list shared by every query returning a full project row.
const COLUMNS: &str = "id, account_id, name, listing_type, price, original_price, bedrooms, \
                       bathrooms, square_feet, property_address, description, agent_name, \
                       agent_phone, agent_company, color_scheme, custom_hex, style, aspect_ratio, \
                       status, created_at, updated_at";

pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project in `generating` status.
    pub async fn create(pool: &DbPool, data: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO projects (
                account_id, name, listing_type, price, original_price, bedrooms, bathrooms,
                square_feet, property_address, description, agent_name, agent_phone,
                agent_company, color_scheme, custom_hex, style, aspect_ratio
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {COLUMNS}
            "#
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(data.account_id)
            .bind(&data.name)
            .bind(&data.listing_type)
            .bind(&data.price)
            .bind(&data.original_price)
            .bind(data.bedrooms)
            .bind(data.bathrooms)
            .bind(data.square_feet)
            .bind(&data.property_address)
            .bind(&data.description)
            .bind(&data.agent_name)
            .bind(&data.agent_phone)
            .bind(&data.agent_company)
            .bind(&data.color_scheme)
            .bind(&data.custom_hex)
            .bind(&data.style)
            .bind(&data.aspect_ratio)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a project only if it belongs to the given account. Callers
    /// treat a miss as not-found; ownership is never disclosed.
    pub async fn find_owned(
        pool: &DbPool,
        id: DbId,
        account_id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND account_id = $2");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// All projects for one account, newest first.
    pub async fn list_for_account(
        pool: &DbPool,
        account_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE account_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Flip the lifecycle status. Returns `false` when the project does
    /// not exist.
    pub async fn update_status(
        pool: &DbPool,
        id: DbId,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE projects SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard delete. Property images and generated results go with the row
    /// via ON DELETE CASCADE.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
