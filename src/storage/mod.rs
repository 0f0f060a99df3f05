// Submodules for local file system storage, S3 storage and the startup retry loop
pub mod local;
pub mod retry;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

pub use crate::storage::{local::LocalStorage, s3::S3Storage};
use crate::config::Config;

// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Invalid asset name: {0}")]
    InvalidName(String),

    #[error("Io Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Upload Error: {0}")]
    UploadError(String),

    #[error("Download Error: {0}")]
    DownloadError(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Put/get capability shared by every asset backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `content` under `name`, replacing anything already there.
    async fn put(&self, name: &str, content: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// Fetch the bytes stored under `name`.
    async fn get(&self, name: &str) -> Result<Bytes, StorageError>;

    /// Path under which the asset is reachable from the browser.
    fn public_path(&self, name: &str) -> String;
}

// Enum to represent storage backends
#[derive(Clone)]
pub enum StorageBackend {
    Local(LocalStorage), // Local filesystem storage
    S3(S3Storage),       // AWS S3 or MinIO storage
}

// Delegates calls to the chosen backend
#[async_trait]
impl Storage for StorageBackend {
    async fn put(&self, name: &str, content: Bytes, content_type: &str) -> Result<(), StorageError> {
        match self {
            StorageBackend::Local(s) => s.put(name, content, content_type).await,
            StorageBackend::S3(s) => s.put(name, content, content_type).await,
        }
    }

    async fn get(&self, name: &str) -> Result<Bytes, StorageError> {
        match self {
            StorageBackend::Local(s) => s.get(name).await,
            StorageBackend::S3(s) => s.get(name).await,
        }
    }

    fn public_path(&self, name: &str) -> String {
        match self {
            StorageBackend::Local(s) => s.public_path(name),
            StorageBackend::S3(s) => s.public_path(name),
        }
    }
}

/// Asset names are flat: no separators, no parent references.
pub(crate) fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

// Initialize the storage backend based on config
pub async fn init_storage(config: &Config) -> StorageBackend {
    if config.use_s3 {
        info!("Initializing S3 storage");
        StorageBackend::S3(S3Storage::new(config).await)
    } else {
        info!("Initializing Local storage at {:?}", config.upload_dir);
        StorageBackend::Local(LocalStorage::new(&config.upload_dir))
    }
}
