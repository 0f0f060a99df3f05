use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_credential_types::Credentials;
use aws_sdk_s3::{Client, primitives::ByteStream};
use aws_types::region::Region;
use bytes::Bytes;
use tracing::{error, info};

use crate::{
    config::Config,
    storage::{Storage, StorageError, retry::retry_startup, validate_name},
};

/// Route that streams bucket objects back to the browser.
pub const PUBLIC_PREFIX: &str = "/img";

// S3 / MinIO storage backend
#[derive(Clone, Debug)]
pub struct S3Storage {
    client: Client, // AWS S3 client
    bucket: String, // S3 bucket name
}

impl S3Storage {
    /// Build the S3 client and make sure the bucket exists.
    ///
    /// The bucket check follows the configured retry policy. When the policy
    /// gives up the client is still returned, and requests that reach the
    /// bucket will fail until it becomes available.
    pub async fn new(config: &Config) -> Self {
        let region_provider = RegionProviderChain::first_try(Region::new(config.storage_region.clone()))
            .or_default_provider()
            .or_else(Region::new("us-east-1"));

        let credentials = Credentials::new(
            config.storage_access_key.clone(),
            config.storage_secret_key.clone(),
            None,
            None,
            "noteboard",
        );

        let aws_config = aws_config::from_env()
            .region(region_provider)
            .endpoint_url(&config.storage_endpoint)
            .credentials_provider(credentials)
            .load()
            .await;

        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(true) // Required for MinIO
                .build(),
        );

        let storage = Self::with_client(client, config.storage_bucket.clone());

        match retry_startup(&config.retry_policy(), "Bucket check", || storage.ensure_bucket_exists()).await {
            Ok(()) => info!("Object storage initialized at {}", config.storage_endpoint),
            Err(e) => error!(
                "Continuing without a verified bucket {}: {}",
                storage.bucket, e
            ),
        }

        storage
    }

    /// Wrap an already configured client; no bucket check is made.
    pub fn with_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Verify the bucket, creating it when the store reports it missing.
    async fn ensure_bucket_exists(&self) -> Result<(), StorageError> {
        let bucket = self.bucket.as_str();
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => {
                info!("Bucket {} already exists", bucket);
                return Ok(());
            }
            Err(e) => {
                let missing = e.as_service_error().is_some_and(|svc| svc.is_not_found());
                if !missing {
                    return Err(StorageError::Unavailable(e.to_string()));
                }
            }
        }

        match self.client.create_bucket().bucket(bucket).send().await {
            Ok(_) => {
                info!("Bucket {} created successfully", bucket);
                Ok(())
            }
            Err(e) => {
                let err_msg = format!("{:?}", e);
                if err_msg.contains("BucketAlreadyOwnedByYou")
                    || err_msg.contains("BucketAlreadyExists")
                    || err_msg.contains("YourPreviousRequestToCreateTheBucket")
                {
                    info!("Bucket {} already exists", bucket);
                    Ok(())
                } else {
                    Err(StorageError::Unavailable(e.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(&self, name: &str, content: Bytes, content_type: &str) -> Result<(), StorageError> {
        validate_name(name)?;
        let size = content.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(name)
            .content_type(content_type)
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|e| StorageError::UploadError(e.to_string()))?;

        info!("Stored object {} in bucket {} ({} bytes)", name, self.bucket, size);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Bytes, StorageError> {
        validate_name(name)?;

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|svc| svc.is_no_such_key()) {
                    StorageError::NotFound(name.to_string())
                } else {
                    StorageError::DownloadError(e.to_string())
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadError(e.to_string()))?;

        Ok(data.into_bytes())
    }

    fn public_path(&self, name: &str) -> String {
        format!("{}/{}", PUBLIC_PREFIX, name)
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::config::{BehaviorVersion, retry::RetryConfig};

    use super::*;

    // Nothing listens on port 1, so every request fails at connect time.
    fn unreachable_storage() -> S3Storage {
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("key", "secret", None, None, "test"))
            .endpoint_url("http://127.0.0.1:1")
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .build();
        S3Storage::with_client(Client::from_conf(conf), "notes")
    }

    #[test]
    fn public_path_points_at_image_route() {
        let storage = unreachable_storage();
        assert_eq!(storage.public_path("x.png"), "/img/x.png");
    }

    #[tokio::test]
    async fn invalid_names_are_rejected_before_any_request() {
        let storage = unreachable_storage();

        let err = storage.get("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));

        let err = storage
            .put("a/b.png", Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable_not_missing() {
        let storage = unreachable_storage();

        let err = storage.ensure_bucket_exists().await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));

        let err = storage.get("a.png").await.unwrap_err();
        assert!(matches!(err, StorageError::DownloadError(_)));

        let err = storage
            .put("a.png", Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadError(_)));
    }
}
