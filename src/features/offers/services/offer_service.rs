use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::jobs::models::Job;
use crate::features::jobs::repositories::JobRepository;
use crate::features::offers::dtos::{
    AcceptedOfferDto, JobOfferDto, MyOfferDto, OfferProviderDto, OfferResponseDto, SubmitOfferDto,
};
use crate::features::offers::models::NewOffer;
use crate::features::offers::repositories::OfferRepository;
use crate::features::providers::repositories::ProviderProfileRepository;
use crate::features::ratings::RatingService;
use crate::shared::validation::collapse_whitespace;

/// Service for making, listing and accepting offers
pub struct OfferService {
    offers: Arc<dyn OfferRepository>,
    jobs: Arc<dyn JobRepository>,
    providers: Arc<dyn ProviderProfileRepository>,
    ratings: Arc<RatingService>,
}

impl OfferService {
    pub fn new(
        offers: Arc<dyn OfferRepository>,
        jobs: Arc<dyn JobRepository>,
        providers: Arc<dyn ProviderProfileRepository>,
        ratings: Arc<RatingService>,
    ) -> Self {
        Self {
            offers,
            jobs,
            providers,
            ratings,
        }
    }

    async fn require_job(&self, job_id: Uuid) -> Result<Job> {
        self.jobs
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job '{}' not found", job_id)))
    }

    /// Make a pending offer on an open job
    pub async fn submit(
        &self,
        user: &AuthenticatedUser,
        job_id: Uuid,
        dto: SubmitOfferDto,
    ) -> Result<OfferResponseDto> {
        let dto = SubmitOfferDto {
            message: collapse_whitespace(&dto.message),
            ..dto
        };
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let inserted = self
            .offers
            .insert_for_open_job(NewOffer {
                job_id,
                provider_id: user.user_id,
                message: dto.message,
                proposed_rate: dto.proposed_rate,
            })
            .await?;

        let Some(offer) = inserted else {
            // Work out why the conditional insert matched nothing
            let job = self.require_job(job_id).await?;
            if job.posted_by == user.user_id {
                return Err(AppError::Forbidden(
                    "You cannot make an offer on your own job".to_string(),
                ));
            }
            return Err(AppError::Conflict(
                "Job is no longer open for offers".to_string(),
            ));
        };

        tracing::info!(
            "Provider {} offered {} on job {}",
            offer.provider_id,
            offer.proposed_rate,
            offer.job_id
        );
        Ok(offer.into())
    }

    /// Offers on a job, newest first, with each bidder's profile and rating
    pub async fn list_for_job(
        &self,
        user: &AuthenticatedUser,
        job_id: Uuid,
    ) -> Result<Vec<JobOfferDto>> {
        let job = self.require_job(job_id).await?;
        if job.posted_by != user.user_id && !user.is_admin() {
            return Err(AppError::Forbidden(
                "Only the homeowner who posted the job can view its offers".to_string(),
            ));
        }

        let offers = self.offers.list_by_job(job_id).await?;
        let provider_ids: Vec<Uuid> = offers
            .iter()
            .map(|o| o.provider_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let profiles: HashMap<Uuid, _> = self
            .providers
            .find_by_user_ids(&provider_ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();
        let summaries = self.ratings.summaries(&provider_ids).await?;

        Ok(offers
            .into_iter()
            .map(|offer| {
                let provider = profiles.get(&offer.provider_id).cloned().map(|profile| {
                    let rating = summaries
                        .get(&profile.user_id)
                        .copied()
                        .unwrap_or_default();
                    OfferProviderDto::new(profile, rating)
                });
                JobOfferDto {
                    offer: offer.into(),
                    provider,
                }
            })
            .collect())
    }

    /// The caller's offers, newest first, each with a summary of its job
    pub async fn list_mine(&self, user: &AuthenticatedUser) -> Result<Vec<MyOfferDto>> {
        let offers = self.offers.list_by_provider(user.user_id).await?;
        let job_ids: Vec<Uuid> = offers.iter().map(|o| o.job_id).collect();

        let mut jobs: HashMap<Uuid, Job> = self
            .jobs
            .find_by_ids(&job_ids)
            .await?
            .into_iter()
            .map(|j| (j.id, j))
            .collect();

        Ok(offers
            .into_iter()
            .map(|offer| MyOfferDto {
                job: jobs.remove(&offer.job_id).map(Into::into),
                offer: offer.into(),
            })
            .collect())
    }

    /// Accept an offer on one of the caller's jobs
    pub async fn accept(
        &self,
        user: &AuthenticatedUser,
        offer_id: Uuid,
    ) -> Result<AcceptedOfferDto> {
        let offer = self
            .offers
            .find_by_id(offer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Offer '{}' not found", offer_id)))?;
        let job = self.require_job(offer.job_id).await?;

        if job.posted_by != user.user_id {
            return Err(AppError::Forbidden(
                "Only the homeowner who posted the job can accept offers".to_string(),
            ));
        }

        let accepted = self.offers.accept(offer_id).await?;

        tracing::info!(
            "Offer {} accepted: job {} assigned to provider {}, {} sibling offer(s) rejected",
            accepted.offer.id,
            accepted.job.id,
            accepted.offer.provider_id,
            accepted.rejected_offer_ids.len()
        );

        Ok(AcceptedOfferDto {
            job: accepted.job.into(),
            offer: accepted.offer.into(),
            rejected_offer_ids: accepted.rejected_offer_ids,
        })
    }
}
