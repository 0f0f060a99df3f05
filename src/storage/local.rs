use std::{io::ErrorKind, path::{Path, PathBuf}};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::{fs, io::AsyncWriteExt};

use super::{Storage, StorageError, validate_name};

/// Prefix under which the upload directory is served as static files.
pub const PUBLIC_PREFIX: &str = "/uploads";

// Local filesystem storage
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf, // Directory where assets are stored, created on first write
}

impl LocalStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn get_full_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.base_path.join(name))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    /// Writes content to a file under the upload directory
    async fn put(&self, name: &str, content: Bytes, _content_type: &str) -> Result<(), StorageError> {
        let full_path = self.get_full_path(name)?;

        fs::create_dir_all(&self.base_path).await?;

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(&content).await?;
        file.flush().await?;

        tracing::info!("Saved asset at {:?} ({} bytes)", full_path, content.len());
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Bytes, StorageError> {
        let full_path = self.get_full_path(name)?;

        match fs::read(&full_path).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(name.to_string())),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    fn public_path(&self, name: &str) -> String {
        format!("{}/{}", PUBLIC_PREFIX, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directory_is_created_on_first_put() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested/uploads");
        let storage = LocalStorage::new(&root);
        assert!(!root.exists());

        storage
            .put("a.png", Bytes::from_static(b"png-bytes"), "image/png")
            .await
            .unwrap();

        assert!(root.join("a.png").is_file());
        assert_eq!(storage.get("a.png").await.unwrap(), Bytes::from_static(b"png-bytes"));
    }

    #[tokio::test]
    async fn missing_asset_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = storage.get("missing.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(name) if name == "missing.png"));
    }

    #[tokio::test]
    async fn traversal_is_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = storage
            .put("../escape.png", Bytes::new(), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }

    #[test]
    fn public_path_points_at_static_route() {
        let storage = LocalStorage::new("uploads");
        assert_eq!(storage.public_path("x.jpg"), "/uploads/x.jpg");
    }
}
