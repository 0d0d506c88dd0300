//! Shared application state.

use std::sync::Arc;

use flyerforge_db::DbPool;
use flyerforge_gemini::ImageGenerator;
use flyerforge_storage::ObjectStore;

use crate::config::ServerConfig;

/// State shared across all request handlers.
///
/// The object store and image generator are trait objects so integration
/// tests can swap in fakes without touching the router.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn ObjectStore>,
    pub generator: Arc<dyn ImageGenerator>,
}
