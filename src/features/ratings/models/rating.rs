use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Database model for `provider_ratings`
#[derive(Debug, Clone, FromRow)]
pub struct ProviderRating {
    pub id: Uuid,
    pub homeowner_id: Uuid,
    pub provider_id: Uuid,
    /// `None` once the rated job has been deleted
    pub job_id: Option<Uuid>,
    pub rating: i16,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub homeowner_id: Uuid,
    pub provider_id: Uuid,
    pub job_id: Uuid,
    pub rating: i16,
    pub review: Option<String>,
}

/// Raw aggregate row for one provider
#[derive(Debug, Clone, FromRow)]
pub struct RatingStats {
    pub provider_id: Uuid,
    pub average: f64,
    pub count: i64,
}

/// Average rating (one decimal place) and number of ratings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
}

impl RatingSummary {
    pub fn new(average: f64, count: i64) -> Self {
        if count == 0 {
            return Self::default();
        }
        Self {
            average: (average * 10.0).round() / 10.0,
            count,
        }
    }
}

impl From<RatingStats> for RatingSummary {
    fn from(stats: RatingStats) -> Self {
        Self::new(stats.average, stats.count)
    }
}
