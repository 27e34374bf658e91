use std::sync::Arc;

use axum::extract::Multipart;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::modules::storage::ObjectStorage;
use crate::shared::constants::PROFILE_PICTURES_FOLDER;

/// Storage prefix holding every profile picture of one user
pub fn profile_image_prefix(user_id: Uuid) -> String {
    format!("{}/{}/", PROFILE_PICTURES_FOLDER, user_id)
}

/// An uploaded image, as read from the multipart body
#[derive(Debug, Clone)]
pub struct ProfileImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ProfileImageUpload {
    /// Read the `file` field of a multipart form; other fields are ignored
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self> {
        let mut upload = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Failed to read multipart field: {}", e);
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        })? {
            if field.name() != Some("file") {
                debug!("Ignoring unknown field: {:?}", field.name());
                continue;
            }

            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let file_name = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;

            upload = Some(Self {
                file_name,
                content_type,
                data: data.to_vec(),
            });
        }

        upload.ok_or_else(|| AppError::BadRequest("File is required".to_string()))
    }

    fn extension(&self) -> String {
        let from_type = match self.content_type.as_str() {
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            _ => None,
        };

        from_type
            .map(str::to_string)
            .or_else(|| {
                self.file_name
                    .as_deref()
                    .and_then(|name| name.rsplit_once('.'))
                    .map(|(_, ext)| ext.to_ascii_lowercase())
                    .filter(|ext| {
                        !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
                    })
            })
            .unwrap_or_else(|| "img".to_string())
    }
}

/// Profile pictures of every user, one current picture per user.
///
/// Pictures live under `profile_pictures/{user_id}/{unix_millis}.{ext}`;
/// storing a new one removes the earlier ones first.
pub struct ProfileImages {
    storage: Arc<dyn ObjectStorage>,
    max_bytes: usize,
}

impl ProfileImages {
    pub fn new(storage: Arc<dyn ObjectStorage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    /// Reject anything that is not a non-empty image within the size limit
    pub fn check(&self, upload: &ProfileImageUpload) -> Result<()> {
        if !upload.content_type.starts_with("image/") {
            return Err(AppError::BadRequest(format!(
                "File type '{}' is not allowed. Only images can be uploaded",
                upload.content_type
            )));
        }
        if upload.data.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }
        if upload.data.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} MB",
                self.max_bytes / 1024 / 1024
            )));
        }
        Ok(())
    }

    /// Replace the user's picture and return its public URL
    pub async fn replace(&self, user_id: Uuid, upload: ProfileImageUpload) -> Result<String> {
        self.check(&upload)?;
        self.remove_all(user_id).await?;

        let key = format!(
            "{}{}.{}",
            profile_image_prefix(user_id),
            Utc::now().timestamp_millis(),
            upload.extension()
        );
        self.storage
            .upload(&key, upload.data, &upload.content_type)
            .await?;

        tracing::info!("Profile image stored for {}: {}", user_id, key);
        Ok(self.storage.public_url(&key))
    }

    /// Delete every stored picture of a user; returns how many were removed
    pub async fn remove_all(&self, user_id: Uuid) -> Result<usize> {
        let keys = self.storage.list(&profile_image_prefix(user_id)).await?;
        for key in &keys {
            self.storage.delete(key).await?;
        }
        if !keys.is_empty() {
            tracing::debug!("Removed {} profile image(s) of {}", keys.len(), user_id);
        }
        Ok(keys.len())
    }
}
