use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::ratings::models::{ProviderRating, RatingSummary};

/// Request DTO for rating the provider of a completed job
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitRatingDto {
    pub job_id: Uuid,

    /// Must be the provider assigned to the job
    pub provider_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(minimum = 1, maximum = 5, example = 5)]
    pub rating: i16,

    #[validate(length(max = 500, message = "Review must be at most 500 characters"))]
    #[schema(example = "Great work")]
    pub review: Option<String>,
}

/// A single rating, as shown in a provider's review list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatingResponseDto {
    pub id: Uuid,
    /// `null` once the rated job has been deleted
    pub job_id: Option<Uuid>,
    pub provider_id: Uuid,
    pub homeowner_id: Uuid,
    pub rating: i16,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProviderRating> for RatingResponseDto {
    fn from(r: ProviderRating) -> Self {
        Self {
            id: r.id,
            job_id: r.job_id,
            provider_id: r.provider_id,
            homeowner_id: r.homeowner_id,
            rating: r.rating,
            review: r.review,
            created_at: r.created_at,
        }
    }
}

/// Aggregate plus reviews for one provider
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderRatingsDto {
    pub provider_id: Uuid,
    pub summary: RatingSummary,
    pub reviews: Vec<RatingResponseDto>,
}
