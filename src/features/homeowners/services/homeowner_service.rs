use std::sync::Arc;

use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::homeowners::dtos::{HomeownerProfileDto, UpdateHomeownerProfileDto};
use crate::features::homeowners::models::HomeownerProfileChanges;
use crate::features::homeowners::repositories::HomeownerProfileRepository;
use crate::modules::storage::{ProfileImageUpload, ProfileImages};
use crate::shared::validation::{blank_to_none, collapse_whitespace};

/// Service for the homeowner settings screen
pub struct HomeownerService {
    profiles: Arc<dyn HomeownerProfileRepository>,
    images: Arc<ProfileImages>,
}

impl HomeownerService {
    pub fn new(profiles: Arc<dyn HomeownerProfileRepository>, images: Arc<ProfileImages>) -> Self {
        Self { profiles, images }
    }

    /// The caller's settings; empty until anything has been saved
    pub async fn get_my_profile(&self, user: &AuthenticatedUser) -> Result<HomeownerProfileDto> {
        Ok(self
            .profiles
            .find_by_user(user.user_id)
            .await?
            .map(Into::into)
            .unwrap_or_else(|| HomeownerProfileDto::empty(user.user_id)))
    }

    pub async fn update_my_profile(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateHomeownerProfileDto,
    ) -> Result<HomeownerProfileDto> {
        let dto = UpdateHomeownerProfileDto {
            full_name: collapse_whitespace(&dto.full_name),
            phone: blank_to_none(dto.phone),
            city: blank_to_none(dto.city.as_deref().map(collapse_whitespace)),
        };
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let profile = self
            .profiles
            .upsert(
                user.user_id,
                HomeownerProfileChanges {
                    full_name: Some(dto.full_name),
                    phone: dto.phone,
                    city: dto.city,
                },
            )
            .await?;

        tracing::info!("Homeowner profile updated: {}", user.user_id);
        Ok(profile.into())
    }

    /// Replace the caller's profile picture
    pub async fn upload_profile_image(
        &self,
        user: &AuthenticatedUser,
        upload: ProfileImageUpload,
    ) -> Result<HomeownerProfileDto> {
        let url = self.images.replace(user.user_id, upload).await?;
        let profile = self
            .profiles
            .set_profile_image(user.user_id, Some(&url))
            .await?;

        tracing::info!("Homeowner {} changed profile picture", user.user_id);
        Ok(profile.into())
    }
}
