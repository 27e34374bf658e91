use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::core::config::MarketplaceConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::CategoryService;
use crate::features::jobs::dtos::{JobFieldsDto, JobResponseDto};
use crate::features::jobs::models::{Job, JobChanges, JobStatus, NewJob};
use crate::features::jobs::repositories::JobRepository;
use crate::features::providers::repositories::ProviderProfileRepository;
use crate::shared::validation::{blank_to_none, collapse_whitespace};

/// Who may move `job` to `target`, assuming the transition itself is legal
fn actor_may_set(job: &Job, user: &AuthenticatedUser, target: JobStatus) -> bool {
    if user.is_admin() {
        return true;
    }

    let is_owner = job.posted_by == user.user_id;
    let is_assigned = job.assigned_provider_id == Some(user.user_id);

    match (job.status, target) {
        (JobStatus::Open, JobStatus::Cancelled) => is_owner,
        (JobStatus::Assigned, JobStatus::InProgress) => is_assigned,
        (JobStatus::Assigned | JobStatus::InProgress, JobStatus::Completed) => {
            is_owner || is_assigned
        }
        _ => false,
    }
}

/// Trim and collapse the form fields before validation
fn sanitise(dto: JobFieldsDto) -> JobFieldsDto {
    JobFieldsDto {
        title: collapse_whitespace(&dto.title),
        category_id: dto.category_id,
        description: dto.description.trim().to_string(),
        budget: blank_to_none(dto.budget.as_deref().map(collapse_whitespace)),
        city: collapse_whitespace(&dto.city),
        date_time: dto.date_time,
    }
}

/// Service for the job posting workflow and status changes
pub struct JobService {
    jobs: Arc<dyn JobRepository>,
    providers: Arc<dyn ProviderProfileRepository>,
    categories: Arc<CategoryService>,
    config: MarketplaceConfig,
}

impl JobService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        providers: Arc<dyn ProviderProfileRepository>,
        categories: Arc<CategoryService>,
        config: MarketplaceConfig,
    ) -> Self {
        Self {
            jobs,
            providers,
            categories,
            config,
        }
    }

    /// Post a job as `open`, subject to the per-homeowner rate limit
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: JobFieldsDto,
    ) -> Result<JobResponseDto> {
        let dto = self.validated(dto).await?;
        let window_start = Utc::now() - self.config.job_rate_limit_window;

        let job = self
            .jobs
            .insert_rate_limited(
                NewJob {
                    posted_by: user.user_id,
                    title: dto.title,
                    category_id: dto.category_id,
                    description: dto.description,
                    budget: dto.budget,
                    city: dto.city,
                    date_time: dto.date_time,
                },
                window_start,
                self.config.job_rate_limit_max,
            )
            .await
            .inspect_err(|e| {
                if matches!(e, AppError::RateLimitExceeded(_)) {
                    tracing::warn!("Job posting rate limit hit by {}", user.user_id);
                }
            })?;

        tracing::info!("Job posted: {} by {}", job.id, user.user_id);
        Ok(job.into())
    }

    /// Edit a job; only the owner, and only while it is open
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: JobFieldsDto,
    ) -> Result<JobResponseDto> {
        let dto = self.validated(dto).await?;

        let changes = JobChanges {
            title: dto.title,
            category_id: dto.category_id,
            description: dto.description,
            budget: dto.budget,
            city: dto.city,
            date_time: dto.date_time,
        };

        if let Some(job) = self.jobs.update_open(id, user.user_id, changes).await? {
            tracing::info!("Job updated: {}", id);
            return Ok(job.into());
        }

        // Nothing matched: explain why
        let job = self.find(id).await?;
        if job.posted_by != user.user_id {
            return Err(AppError::Forbidden(
                "Only the homeowner who posted the job can edit it".to_string(),
            ));
        }
        Err(AppError::Conflict(format!(
            "Job can only be edited while open (currently {})",
            job.status
        )))
    }

    /// Hard-delete a job; owner or admin, never while work is under way
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let job = self.find(id).await?;
        if job.posted_by != user.user_id && !user.is_admin() {
            return Err(AppError::Forbidden(
                "Only the job owner or an admin can delete a job".to_string(),
            ));
        }
        if job.status.is_active_work() {
            return Err(AppError::Conflict(
                "Cannot delete a job that is assigned or in progress".to_string(),
            ));
        }

        let deletable: Vec<JobStatus> = JobStatus::ALL
            .into_iter()
            .filter(|s| !s.is_active_work())
            .collect();
        if !self.jobs.delete_in_status(id, &deletable).await? {
            // Assigned or removed since it was read
            return match self.jobs.find_by_id(id).await? {
                Some(_) => Err(AppError::Conflict(
                    "Cannot delete a job that is assigned or in progress".to_string(),
                )),
                None => Err(AppError::NotFound(format!("Job '{}' not found", id))),
            };
        }

        tracing::info!("Job deleted: {} by {}", id, user.user_id);
        Ok(())
    }

    /// Apply a status change on behalf of the owner, the assigned provider or an admin
    pub async fn set_status(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        target: JobStatus,
    ) -> Result<JobResponseDto> {
        if target == JobStatus::Assigned {
            return Err(AppError::BadRequest(
                "Jobs are assigned by accepting an offer".to_string(),
            ));
        }

        let job = self.find(id).await?;
        let participant = user.is_admin()
            || job.posted_by == user.user_id
            || job.assigned_provider_id == Some(user.user_id);
        if !participant {
            return Err(AppError::Forbidden(
                "You are not allowed to change this job".to_string(),
            ));
        }

        if !job.status.can_transition_to(target) {
            return Err(AppError::BadRequest(format!(
                "Invalid status transition from {} to {}",
                job.status, target
            )));
        }
        if !actor_may_set(&job, user, target) {
            return Err(AppError::Forbidden(format!(
                "You are not allowed to move this job from {} to {}",
                job.status, target
            )));
        }

        let updated = self
            .jobs
            .transition_status(id, job.status, target)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Job status was changed by someone else".to_string())
            })?;

        tracing::info!(
            "Job {} moved {} -> {} by {}",
            id,
            job.status,
            target,
            user.user_id
        );
        Ok(updated.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<JobResponseDto> {
        self.find(id).await.map(Into::into)
    }

    /// Jobs posted by the caller, newest first
    pub async fn list_mine(&self, user: &AuthenticatedUser) -> Result<Vec<JobResponseDto>> {
        let jobs = self.jobs.list_by_owner(user.user_id).await?;
        Ok(jobs.into_iter().map(Into::into).collect())
    }

    /// Provider feed: open jobs in the provider's skill category, excluding their own postings
    pub async fn list_open(&self, user: &AuthenticatedUser) -> Result<Vec<JobResponseDto>> {
        let profile = self
            .providers
            .find_by_user(user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Provider profile not found".to_string()))?;

        let jobs = self
            .jobs
            .list_open_in_category(profile.skill_category_id, user.user_id)
            .await?;
        Ok(jobs.into_iter().map(Into::into).collect())
    }

    /// Jobs assigned to the caller that are not finished yet
    pub async fn list_assigned(&self, user: &AuthenticatedUser) -> Result<Vec<JobResponseDto>> {
        let jobs = self.jobs.list_active_for_provider(user.user_id).await?;
        Ok(jobs.into_iter().map(Into::into).collect())
    }

    async fn validated(&self, dto: JobFieldsDto) -> Result<JobFieldsDto> {
        let dto = sanitise(dto);
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.categories.require(dto.category_id).await?;
        Ok(dto)
    }

    async fn find(&self, id: Uuid) -> Result<Job> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job '{}' not found", id)))
    }
}
