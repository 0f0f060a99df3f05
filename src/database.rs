use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::sync::RwLock;
use tracing::info;

use crate::models::Note;

/// Initialize a PostgreSQL connection pool and apply pending migrations.
pub async fn init_db(database_url: &str) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to database...");

    // Create a new PostgreSQL connection pool with a maximum of 5 connections
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("Database connection established");
    Ok(pool)
}

/// Persistence for rendered notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Persist a new note and return it with its assigned id.
    async fn insert(&self, content: &str) -> Result<Note, sqlx::Error>;

    /// All notes, oldest first.
    async fn list(&self) -> Result<Vec<Note>, sqlx::Error>;
}

pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn insert(&self, content: &str) -> Result<Note, sqlx::Error> {
        sqlx::query_as::<_, Note>(
            "INSERT INTO notes (content) VALUES ($1) RETURNING id, content, created_at",
        )
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    async fn list(&self) -> Result<Vec<Note>, sqlx::Error> {
        sqlx::query_as::<_, Note>("SELECT id, content, created_at FROM notes ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }
}

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct MemoryNoteStore {
    notes: RwLock<Vec<Note>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(&self, content: &str) -> Result<Note, sqlx::Error> {
        let mut notes = self.notes.write().await;
        let note = Note {
            id: notes.last().map_or(1, |last| last.id + 1),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        notes.push(note.clone());
        Ok(note)
    }

    async fn list(&self) -> Result<Vec<Note>, sqlx::Error> {
        Ok(self.notes.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_assigns_increasing_ids_in_insertion_order() {
        let store = MemoryNoteStore::new();
        let first = store.insert("<p>one</p>\n").await.unwrap();
        let second = store.insert("<p>two</p>\n").await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }
}
