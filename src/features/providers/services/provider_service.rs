use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::CategoryService;
use crate::features::providers::dtos::{
    ProviderDetailDto, ProviderProfileDto, ProviderSearchQuery, ProviderSummaryDto,
    UpdateProviderProfileDto,
};
use crate::features::providers::models::{
    ProviderProfile, ProviderProfileChanges, ProviderSearch,
};
use crate::features::providers::repositories::ProviderProfileRepository;
use crate::features::ratings::RatingService;
use crate::modules::storage::{ProfileImageUpload, ProfileImages};
use crate::shared::validation::{blank_to_none, collapse_whitespace};

/// Service for provider profiles and discovery
pub struct ProviderService {
    providers: Arc<dyn ProviderProfileRepository>,
    categories: Arc<CategoryService>,
    ratings: Arc<RatingService>,
    images: Arc<ProfileImages>,
}

impl ProviderService {
    pub fn new(
        providers: Arc<dyn ProviderProfileRepository>,
        categories: Arc<CategoryService>,
        ratings: Arc<RatingService>,
        images: Arc<ProfileImages>,
    ) -> Self {
        Self {
            providers,
            categories,
            ratings,
            images,
        }
    }

    pub async fn get_my_profile(&self, user: &AuthenticatedUser) -> Result<ProviderProfileDto> {
        self.find(user.user_id).await.map(Into::into)
    }

    pub async fn update_my_profile(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateProviderProfileDto,
    ) -> Result<ProviderProfileDto> {
        let dto = UpdateProviderProfileDto {
            full_name: collapse_whitespace(&dto.full_name),
            phone: dto.phone.trim().to_string(),
            city: collapse_whitespace(&dto.city),
            skill_category_id: dto.skill_category_id,
            bio: blank_to_none(dto.bio),
        };
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.categories.require(dto.skill_category_id).await?;

        let profile = self
            .providers
            .update(
                user.user_id,
                ProviderProfileChanges {
                    full_name: dto.full_name,
                    phone: dto.phone,
                    city: dto.city,
                    skill_category_id: dto.skill_category_id,
                    bio: dto.bio,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Provider profile not found".to_string()))?;

        tracing::info!("Provider profile updated: {}", user.user_id);
        Ok(profile.into())
    }

    /// Replace the caller's profile picture
    pub async fn upload_profile_image(
        &self,
        user: &AuthenticatedUser,
        upload: ProfileImageUpload,
    ) -> Result<ProviderProfileDto> {
        self.images.check(&upload)?;
        self.find(user.user_id).await?;

        let url = self.images.replace(user.user_id, upload).await?;
        let profile = self
            .providers
            .set_profile_image(user.user_id, Some(&url))
            .await?
            .ok_or_else(|| AppError::NotFound("Provider profile not found".to_string()))?;

        tracing::info!("Provider {} changed profile picture", user.user_id);
        Ok(profile.into())
    }

    /// Providers matching the category, city and keyword filters, each with its rating summary
    pub async fn search(&self, query: ProviderSearchQuery) -> Result<Vec<ProviderSummaryDto>> {
        let filter = ProviderSearch {
            category_id: query.category_id,
            city: blank_to_none(query.city),
            keyword: blank_to_none(query.q.as_deref().map(collapse_whitespace)),
        };
        let profiles = self.providers.search(&filter).await?;

        let ids: Vec<Uuid> = profiles.iter().map(|p| p.user_id).collect();
        let mut summaries = self.ratings.summaries(&ids).await?;

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let rating = summaries.remove(&profile.user_id).unwrap_or_default();
                ProviderSummaryDto::new(profile, rating)
            })
            .collect())
    }

    pub async fn get_provider(&self, user_id: Uuid) -> Result<ProviderDetailDto> {
        let profile = self.find(user_id).await?;
        let ratings = self.ratings.for_provider(user_id).await?;

        Ok(ProviderDetailDto {
            profile: ProviderSummaryDto::new(profile, ratings.summary),
            reviews: ratings.reviews,
        })
    }

    async fn find(&self, user_id: Uuid) -> Result<ProviderProfile> {
        self.providers
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Provider profile not found".to_string()))
    }
}
