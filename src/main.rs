use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use noteboard::{
    build_router,
    config::Config,
    database::{MemoryNoteStore, NoteStore, PgNoteStore, init_db},
    state::AppState,
    storage::init_storage,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let notes: Arc<dyn NoteStore> = match &config.database_url {
        Some(url) => {
            let pool = init_db(url).await.context("Failed to connect to db")?;
            Arc::new(PgNoteStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, notes are kept in memory");
            Arc::new(MemoryNoteStore::new())
        }
    };

    // Blocks until the bucket is verified or the retry policy gives up.
    let storage = init_storage(&config).await;

    let addr = config.bind_addr;
    let app_state = AppState {
        notes,
        storage,
        config,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server exited")?;

    Ok(())
}
