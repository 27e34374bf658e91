use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::accounts::AccountService;
use crate::features::admin::dtos::*;
use crate::features::auth::clients::IdentityProvider;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::features::categories::CategoryService;
use crate::features::jobs::dtos::JobResponseDto;
use crate::features::jobs::models::JobStatus;
use crate::features::jobs::repositories::JobRepository;
use crate::features::jobs::JobService;
use crate::features::offers::repositories::OfferRepository;
use crate::features::providers::repositories::ProviderProfileRepository;
use crate::features::ratings::repositories::RatingRepository;
use crate::features::roles::{Role, UserRoleRepository};

/// Repositories the admin views read from
pub struct AdminRepositories {
    pub roles: Arc<dyn UserRoleRepository>,
    pub providers: Arc<dyn ProviderProfileRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub ratings: Arc<dyn RatingRepository>,
}

/// Service for admin moderation
///
/// Job and account changes go through the same services the users' own
/// requests use, so admin actions follow the same rules.
pub struct AdminService {
    repos: AdminRepositories,
    identity: Arc<dyn IdentityProvider>,
    job_service: Arc<JobService>,
    categories: Arc<CategoryService>,
    accounts: Arc<AccountService>,
}

impl AdminService {
    pub fn new(
        repos: AdminRepositories,
        identity: Arc<dyn IdentityProvider>,
        job_service: Arc<JobService>,
        categories: Arc<CategoryService>,
        accounts: Arc<AccountService>,
    ) -> Self {
        Self {
            repos,
            identity,
            job_service,
            categories,
            accounts,
        }
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// Every identity merged with its role and, for providers, profile name
    pub async fn list_users(&self) -> Result<Vec<AdminUserDto>> {
        let identities = self.identity.admin_list_users().await?;
        let roles: HashMap<Uuid, Role> = self
            .repos
            .roles
            .list_all()
            .await?
            .into_iter()
            .map(|r| (r.user_id, r.role))
            .collect();

        let provider_ids: Vec<Uuid> = roles
            .iter()
            .filter(|(_, role)| **role == Role::ServiceProvider)
            .map(|(id, _)| *id)
            .collect();
        let names: HashMap<Uuid, String> = self
            .repos
            .providers
            .find_by_user_ids(&provider_ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p.full_name))
            .collect();

        let mut users: Vec<AdminUserDto> = identities
            .into_iter()
            .map(|user| AdminUserDto {
                role: roles.get(&user.id).copied(),
                full_name: names.get(&user.id).cloned(),
                id: user.id,
                email: user.email,
                created_at: user.created_at,
                last_sign_in_at: user.last_sign_in_at,
            })
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    pub async fn change_role(
        &self,
        admin: &AuthenticatedUser,
        user_id: Uuid,
        dto: ChangeRoleDto,
    ) -> Result<AdminRoleDto> {
        if user_id == admin.user_id && dto.role != Role::Admin {
            return Err(AppError::Forbidden(
                "You cannot remove your own admin role".to_string(),
            ));
        }

        let record = self
            .repos
            .roles
            .update_role(user_id, dto.role)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' has no role", user_id)))?;

        tracing::info!(
            "Admin {} changed role of {} to {}",
            admin.user_id,
            record.user_id,
            record.role
        );
        Ok(AdminRoleDto {
            user_id: record.user_id,
            role: record.role,
        })
    }

    pub async fn delete_user(&self, admin: &AuthenticatedUser, user_id: Uuid) -> Result<()> {
        if user_id == admin.user_id {
            return Err(AppError::Forbidden(
                "Use account deletion to delete your own account".to_string(),
            ));
        }
        self.accounts.delete_account(user_id).await?;
        tracing::info!("Admin {} deleted user {}", admin.user_id, user_id);
        Ok(())
    }

    // =========================================================================
    // JOBS
    // =========================================================================

    /// All jobs, newest first, with the poster's email when known
    pub async fn list_jobs(&self, offset: i64, limit: i64) -> Result<(Vec<AdminJobDto>, i64)> {
        let (jobs, total) = self.repos.jobs.list_page(offset, limit).await?;

        // Emails are decoration; the list still renders if the identity service is down
        let emails: HashMap<Uuid, String> = match self.identity.admin_list_users().await {
            Ok(users) => users
                .into_iter()
                .filter_map(|u| u.email.map(|email| (u.id, email)))
                .collect(),
            Err(e) => {
                tracing::warn!("Could not load poster emails: {}", e);
                HashMap::new()
            }
        };

        let items = jobs
            .into_iter()
            .map(|job| AdminJobDto {
                poster_email: emails.get(&job.posted_by).cloned(),
                job: job.into(),
            })
            .collect();
        Ok((items, total))
    }

    pub async fn set_job_status(
        &self,
        admin: &AuthenticatedUser,
        job_id: Uuid,
        status: JobStatus,
    ) -> Result<JobResponseDto> {
        self.job_service.set_status(admin, job_id, status).await
    }

    pub async fn delete_job(&self, admin: &AuthenticatedUser, job_id: Uuid) -> Result<()> {
        self.job_service.delete(admin, job_id).await
    }

    // =========================================================================
    // CATEGORIES
    // =========================================================================

    pub async fn create_category(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        self.categories.create(dto).await
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<()> {
        self.categories.delete(id).await
    }

    // =========================================================================
    // STATS
    // =========================================================================

    pub async fn stats(&self) -> Result<AdminStatsDto> {
        let (users_by_role, jobs_by_status, total_offers, total_ratings) = futures::try_join!(
            self.repos.roles.count_by_role(),
            self.repos.jobs.count_by_status(),
            self.repos.offers.count(),
            self.repos.ratings.count(),
        )?;

        Ok(AdminStatsDto {
            users_by_role: users_by_role
                .into_iter()
                .map(|(role, count)| RoleCountDto { role, count })
                .collect(),
            jobs_by_status: jobs_by_status
                .into_iter()
                .map(|(status, count)| JobStatusCountDto { status, count })
                .collect(),
            total_offers,
            total_ratings,
        })
    }
}
