//! Account profile routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route("/portrait", post(handlers::profile::upload_portrait))
}
