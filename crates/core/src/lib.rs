//! Core domain types and pure business logic for FlyerForge.
//!
//! This crate has no I/O. It defines the shared vocabulary (plan tiers,
//! flyer parameters, image references), the error taxonomy, and the
//! prompt compiler that turns a parameter set into a provider request.

pub mod error;
pub mod flyer;
pub mod image_ref;
pub mod plans;
pub mod prompt;
pub mod types;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
