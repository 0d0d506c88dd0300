//! Request handlers.

pub mod auth;
pub mod billing;
pub mod generate;
pub mod profile;
pub mod projects;
