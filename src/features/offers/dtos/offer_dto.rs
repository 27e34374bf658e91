use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::jobs::dtos::JobResponseDto;
use crate::features::jobs::models::{Job, JobStatus};
use crate::features::offers::models::{Offer, OfferStatus};
use crate::features::providers::models::ProviderProfile;
use crate::features::ratings::models::RatingSummary;
use crate::shared::validation::validate_rate;

/// Request DTO for making an offer
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitOfferDto {
    #[validate(length(min = 10, max = 1000, message = "Message must be 10-1000 characters"))]
    #[schema(example = "I can fix it today")]
    pub message: String,

    #[validate(custom(function = "validate_rate"))]
    #[schema(value_type = String, example = "45.00")]
    pub proposed_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferResponseDto {
    pub id: Uuid,
    pub job_id: Uuid,
    pub provider_id: Uuid,
    pub message: String,
    #[schema(value_type = String, example = "45.00")]
    pub proposed_rate: Decimal,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Offer> for OfferResponseDto {
    fn from(o: Offer) -> Self {
        Self {
            id: o.id,
            job_id: o.job_id,
            provider_id: o.provider_id,
            message: o.message,
            proposed_rate: o.proposed_rate,
            status: o.status,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

/// Bidding provider as shown to the homeowner
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferProviderDto {
    pub user_id: Uuid,
    pub full_name: String,
    pub skill_category_id: Uuid,
    pub phone: String,
    pub rating: RatingSummary,
}

impl OfferProviderDto {
    pub fn new(profile: ProviderProfile, rating: RatingSummary) -> Self {
        Self {
            user_id: profile.user_id,
            full_name: profile.full_name,
            skill_category_id: profile.skill_category_id,
            phone: profile.phone,
            rating,
        }
    }
}

/// An offer on one of the caller's jobs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobOfferDto {
    pub offer: OfferResponseDto,
    /// `None` when the provider no longer has a profile
    pub provider: Option<OfferProviderDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferJobSummaryDto {
    pub id: Uuid,
    pub title: String,
    pub city: String,
    pub status: JobStatus,
}

impl From<Job> for OfferJobSummaryDto {
    fn from(j: Job) -> Self {
        Self {
            id: j.id,
            title: j.title,
            city: j.city,
            status: j.status,
        }
    }
}

/// One of the caller's own offers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MyOfferDto {
    pub offer: OfferResponseDto,
    pub job: Option<OfferJobSummaryDto>,
}

/// Result of accepting an offer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AcceptedOfferDto {
    pub job: JobResponseDto,
    pub offer: OfferResponseDto,
    pub rejected_offer_ids: Vec<Uuid>,
}
