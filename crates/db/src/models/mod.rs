//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Serialize` response struct for external-facing output

pub mod account;
pub mod billing_event;
pub mod generated_image;
pub mod project;
pub mod project_image;

pub use account::{Account, AccountResponse, CreateAccount, UpdateAccountProfile};
pub use billing_event::BillingEvent;
pub use generated_image::{CreateGeneratedImage, GeneratedImage, GeneratedImageResponse};
pub use project::{
    CreateProject, Project, ProjectResponse, STATUS_COMPLETED, STATUS_FAILED, STATUS_GENERATING,
};
pub use project_image::{CreateProjectImage, LatestProjectImage, ProjectImage, ProjectImageResponse};
