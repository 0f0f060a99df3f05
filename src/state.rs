use std::sync::Arc;

use crate::config::Config;
use crate::database::NoteStore;
use crate::storage::StorageBackend;

/// Central application state shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Note repository (Postgres or in-memory).
    pub notes: Arc<dyn NoteStore>,

    /// Asset backend (local filesystem or S3), chosen at startup.
    pub storage: StorageBackend,

    pub config: Config,
}
