pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod markdown;
pub mod models;
pub mod state;
pub mod storage;
pub mod submission;
pub mod utils;
pub mod views;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{get_image, health_check, index, list_notes, submit_note},
    state::AppState,
    storage::StorageBackend,
};

// Multipart framing on top of the largest accepted file.
const FORM_OVERHEAD: usize = 64 * 1024;

/// Build the application router.
///
/// `/img/{name}` reads through whichever backend is configured; the local
/// backend's directory is additionally served as static files under `/uploads`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_file_size as usize + FORM_OVERHEAD;

    let mut app = Router::new()
        .route("/", get(index))
        .route("/note", post(submit_note))
        .route("/img/{name}", get(get_image))
        .route("/api/notes", get(list_notes))
        .route("/health", get(health_check));

    if let StorageBackend::Local(local) = &state.storage {
        app = app.nest_service(storage::local::PUBLIC_PREFIX, ServeDir::new(local.base_path()));
    }

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
