use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::providers::models::ProviderProfile;
use crate::features::ratings::dtos::RatingResponseDto;
use crate::features::ratings::models::RatingSummary;
use crate::shared::validation::validate_phone;

/// Response DTO for a provider's own profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderProfileDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub skill_category_id: Uuid,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProviderProfile> for ProviderProfileDto {
    fn from(p: ProviderProfile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            full_name: p.full_name,
            phone: p.phone,
            city: p.city,
            skill_category_id: p.skill_category_id,
            bio: p.bio,
            profile_image_url: p.profile_image_url,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Request DTO for the provider settings screen
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProviderProfileDto {
    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: String,

    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "(512) 555-0143")]
    pub phone: String,

    #[validate(length(min = 2, max = 100, message = "City must be 2-100 characters"))]
    pub city: String,

    pub skill_category_id: Uuid,

    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,
}

/// Multipart form for the profile picture upload.
/// Note: documentation only; the handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadProfileImageDto {
    /// Image file (`image/*`)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Query parameters for provider discovery
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ProviderSearchQuery {
    /// Skill category to match
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring of the provider's city
    pub city: Option<String>,
    /// Free-text search over name, bio, city and skill category name
    pub q: Option<String>,
}

/// Provider card in search results
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderSummaryDto {
    pub user_id: Uuid,
    pub full_name: String,
    pub city: String,
    pub skill_category_id: Uuid,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub rating: RatingSummary,
}

impl ProviderSummaryDto {
    pub fn new(profile: ProviderProfile, rating: RatingSummary) -> Self {
        Self {
            user_id: profile.user_id,
            full_name: profile.full_name,
            city: profile.city,
            skill_category_id: profile.skill_category_id,
            bio: profile.bio,
            profile_image_url: profile.profile_image_url,
            rating,
        }
    }
}

/// Provider page: profile, rating summary and reviews
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderDetailDto {
    pub profile: ProviderSummaryDto,
    pub reviews: Vec<RatingResponseDto>,
}
