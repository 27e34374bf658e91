//! Object storage and the profile pictures kept in it
//!
//! Keys passed to [`ObjectStorage`] are logical paths such as
//! `profile_pictures/{user_id}/1700000000000.png`; backends decide where
//! they physically live.

mod minio_client;
pub mod profile_images;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;
pub use profile_images::{ProfileImageUpload, ProfileImages};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage configuration error: {0}")]
    Configuration(String),

    #[error("Storage request failed: {0}")]
    Request(String),
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        tracing::error!("{}", e);
        AppError::ExternalServiceError(e.to_string())
    }
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;

    /// Keys under `prefix`
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Removing a key that does not exist succeeds
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Anonymous URL a client can render directly
    fn public_url(&self, key: &str) -> String;
}
