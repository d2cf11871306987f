pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

/// Multipart bodies carry whole resume batches; 64MB covers a full batch
/// while still bounding memory.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Batch conversion API
        .route("/api/v1/batches", post(handlers::handle_create_batch))
        .route(
            "/api/v1/batches/:id/archive",
            get(handlers::handle_download_archive),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
