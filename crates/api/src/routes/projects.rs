//! Project and generation routes.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::projects::list_projects))
        .route("/generate", post(handlers::generate::generate))
        .route(
            "/{id}",
            get(handlers::projects::get_project).delete(handlers::projects::delete_project),
        )
        .route("/{id}/regenerate", post(handlers::generate::regenerate))
        .route(
            "/{id}/images/order",
            put(handlers::projects::reorder_images),
        )
}
