use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::homeowners::models::HomeownerProfile;
use crate::shared::validation::validate_phone;

/// Response DTO for the homeowner settings screen
///
/// Timestamps are absent until the first save.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomeownerProfileDto {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl HomeownerProfileDto {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            full_name: None,
            phone: None,
            city: None,
            profile_image_url: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<HomeownerProfile> for HomeownerProfileDto {
    fn from(p: HomeownerProfile) -> Self {
        Self {
            user_id: p.user_id,
            full_name: p.full_name,
            phone: p.phone,
            city: p.city,
            profile_image_url: p.profile_image_url,
            created_at: Some(p.created_at),
            updated_at: Some(p.updated_at),
        }
    }
}

/// Request DTO for the homeowner settings screen
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateHomeownerProfileDto {
    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: String,

    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "(512) 555-0143")]
    pub phone: Option<String>,

    #[validate(length(min = 2, max = 100, message = "City must be 2-100 characters"))]
    pub city: Option<String>,
}
