//! Data access repositories.
//!
//! Stateless structs with static async methods over a pool reference.
//! Queries interpolate a shared `COLUMNS` constant so every row load stays
//! in sync with the model struct.

pub mod account_repo;
pub mod billing_event_repo;
pub mod credit_ledger;
pub mod generated_image_repo;
pub mod project_image_repo;
pub mod project_repo;

pub use account_repo::AccountRepo;
pub use billing_event_repo::BillingEventRepo;
pub use credit_ledger::CreditLedger;
pub use generated_image_repo::GeneratedImageRepo;
pub use project_image_repo::ProjectImageRepo;
pub use project_repo::ProjectRepo;
