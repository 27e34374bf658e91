use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::jobs::models::{Job, JobStatus};

/// Job fields, used both to post a job and to edit an open one
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct JobFieldsDto {
    #[validate(length(min = 5, max = 100, message = "Title must be 5-100 characters"))]
    #[schema(example = "Fix leaking kitchen sink")]
    pub title: String,

    pub category_id: Uuid,

    #[validate(length(min = 20, max = 2000, message = "Description must be 20-2000 characters"))]
    pub description: String,

    /// Free-form budget, e.g. "$50-100"
    #[validate(length(max = 50, message = "Budget must be at most 50 characters"))]
    pub budget: Option<String>,

    #[validate(length(min = 2, max = 100, message = "City must be 2-100 characters"))]
    pub city: String,

    /// Preferred date and time, if any
    pub date_time: Option<DateTime<Utc>>,
}

/// Request DTO for a status change
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateJobStatusDto {
    pub status: JobStatus,
}

/// Response DTO for job
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobResponseDto {
    pub id: Uuid,
    pub posted_by: Uuid,
    pub title: String,
    pub category_id: Uuid,
    pub description: String,
    pub budget: Option<String>,
    pub city: String,
    pub date_time: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub assigned_provider_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponseDto {
    fn from(j: Job) -> Self {
        Self {
            id: j.id,
            posted_by: j.posted_by,
            title: j.title,
            category_id: j.category_id,
            description: j.description,
            budget: j.budget,
            city: j.city,
            date_time: j.date_time,
            status: j.status,
            assigned_provider_id: j.assigned_provider_id,
            created_at: j.created_at,
            updated_at: j.updated_at,
        }
    }
}
