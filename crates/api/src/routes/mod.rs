//! API route definitions.
//!
//! Routes are declared here and delegate to [`crate::handlers`] for the
//! actual request handling.
//!
//! ```text
//! /health                                   GET    liveness + db probe
//! /api/v1
//!   /auth
//!     /register                             POST   create account, issue token
//!     /login                                POST   verify credentials, issue token
//!   /me                                     GET    current account profile
//!   /me                                     PUT    update profile fields
//!   /me/portrait                            POST   upload agent portrait
//!   /projects                               GET    list projects with latest flyer
//!   /projects/generate                      POST   full generation workflow
//!   /projects/{id}                          GET    project detail with images
//!   /projects/{id}                          DELETE delete project + storage cleanup
//!   /projects/{id}/regenerate               POST   re-run generation for a project
//!   /projects/{id}/images/order             PUT    reorder property images
//!   /billing/events                         POST   signed billing webhook
//! ```

pub mod auth;
pub mod billing;
pub mod health;
pub mod profile;
pub mod projects;

use axum::Router;

use crate::state::AppState;

/// Assemble all routes under the `/api/v1` prefix.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/me", profile::router())
        .nest("/projects", projects::router())
        .nest("/billing", billing::router())
}
