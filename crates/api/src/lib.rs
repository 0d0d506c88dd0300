//! FlyerForge API server library.
//!
//! Exposes the building blocks (configuration, state, error handling,
//! routes) so integration tests and the binary entrypoint share the same
//! application assembly.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
