// ABOUTME: Object storage for uploaded images behind a small async trait
// ABOUTME: S3-compatible backend via aws-sdk-s3 and an in-memory backend for development and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Media Storage
//!
//! Objects are addressed by key (`avatar/<sha256>.png`). The backend returns
//! the public URL under which the object is served; that URL is what gets
//! persisted in `media_files.url`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::config::{S3Config, StorageConfig};
use crate::errors::{AppError, AppResult};

/// Object storage used for uploaded media
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `data` under `key` and return its public URL
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<String>;

    /// Remove the object under `key`; missing objects are not an error
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Whether an object exists under `key`
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Public URL for `key`
    fn public_url(&self, key: &str) -> String;
}

/// Build the storage backend selected by configuration
pub async fn from_config(config: &StorageConfig) -> Arc<dyn MediaStorage> {
    match config {
        StorageConfig::S3(s3) => Arc::new(S3MediaStorage::new(s3).await),
        StorageConfig::Memory { public_base_url } => {
            tracing::warn!("Using in-memory media storage, uploads are lost on restart");
            Arc::new(InMemoryMediaStorage::new(public_base_url.clone()))
        }
    }
}

/// S3 or S3-compatible bucket
pub struct S3MediaStorage {
    client: S3Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3MediaStorage {
    /// Create a client with static credentials
    ///
    /// A custom endpoint switches to path-style addressing, which is what
    /// MinIO and most other S3-compatible servers expect.
    pub async fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "giftminder-env",
        );

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("aws"),
            "S3 media storage configured"
        );

        Self {
            client: S3Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            endpoint_url: config.endpoint_url.clone(),
        }
    }
}

#[async_trait]
impl MediaStorage for S3MediaStorage {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<String> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Failed to upload '{key}': {}",
                    e.into_service_error()
                ))
            })?;

        tracing::debug!(key, size, "Uploaded object");
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Failed to delete '{key}': {}",
                    e.into_service_error()
                ))
            })?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(AppError::storage(format!(
                        "Failed to stat '{key}': {service_error}"
                    )))
                }
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        match &self.endpoint_url {
            Some(endpoint) => format!("{}/{}/{key}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com/{key}", self.bucket, self.region),
        }
    }
}

/// Process-local storage
pub struct InMemoryMediaStorage {
    public_base_url: String,
    objects: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryMediaStorage {
    /// Create an empty store serving URLs under `public_base_url`
    #[must_use]
    pub fn new(public_base_url: String) -> Self {
        Self {
            public_base_url,
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn upload(&self, key: &str, data: Bytes, _content_type: &str) -> AppResult<String> {
        self.objects.write().await.insert(key.to_owned(), data);
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let storage = InMemoryMediaStorage::new("http://localhost:8080/media/".to_owned());
        let url = storage
            .upload("avatar/abc.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8080/media/avatar/abc.png");
        assert!(storage.exists("avatar/abc.png").await.unwrap());
        assert_eq!(storage.len().await, 1);

        storage.delete("avatar/abc.png").await.unwrap();
        storage.delete("avatar/abc.png").await.unwrap();
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_s3_public_urls() {
        let mut config = S3Config {
            access_key: "key".into(),
            secret_access_key: "secret".into(),
            region: "eu-central-1".into(),
            bucket: "gifts".into(),
            endpoint_url: None,
        };
        let aws = S3MediaStorage::new(&config).await;
        assert_eq!(
            aws.public_url("content/x.jpg"),
            "https://gifts.s3.eu-central-1.amazonaws.com/content/x.jpg"
        );

        config.endpoint_url = Some("http://minio:9000/".into());
        let minio = S3MediaStorage::new(&config).await;
        assert_eq!(minio.public_url("content/x.jpg"), "http://minio:9000/gifts/content/x.jpg");
    }
}
