use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::jobs::dtos::JobResponseDto;
use crate::features::jobs::models::JobStatus;
use crate::features::roles::Role;

// =============================================================================
// USER DTOs
// =============================================================================

/// Account as seen by admins: identity record merged with role and provider name
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminUserDto {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<Role>,
    /// Provider's profile name, for service providers
    pub full_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangeRoleDto {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminRoleDto {
    pub user_id: Uuid,
    pub role: Role,
}

// =============================================================================
// JOB DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminJobDto {
    #[serde(flatten)]
    pub job: JobResponseDto,
    /// Email of the homeowner, when the identity service knows it
    pub poster_email: Option<String>,
}

// =============================================================================
// STATS DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleCountDto {
    pub role: Role,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobStatusCountDto {
    pub status: JobStatus,
    pub count: i64,
}

/// Dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminStatsDto {
    pub users_by_role: Vec<RoleCountDto>,
    pub jobs_by_status: Vec<JobStatusCountDto>,
    pub total_offers: i64,
    pub total_ratings: i64,
}
