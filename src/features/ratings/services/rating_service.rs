use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::jobs::models::JobStatus;
use crate::features::jobs::repositories::JobRepository;
use crate::features::ratings::dtos::{ProviderRatingsDto, RatingResponseDto, SubmitRatingDto};
use crate::features::ratings::models::{NewRating, RatingSummary};
use crate::features::ratings::repositories::RatingRepository;
use crate::shared::validation::{blank_to_none, collapse_whitespace};

/// Service for rating operations
pub struct RatingService {
    ratings: Arc<dyn RatingRepository>,
    jobs: Arc<dyn JobRepository>,
}

impl RatingService {
    pub fn new(ratings: Arc<dyn RatingRepository>, jobs: Arc<dyn JobRepository>) -> Self {
        Self { ratings, jobs }
    }

    /// Rate the provider who completed one of the caller's jobs
    pub async fn submit(
        &self,
        user: &AuthenticatedUser,
        dto: SubmitRatingDto,
    ) -> Result<RatingResponseDto> {
        let dto = SubmitRatingDto {
            review: blank_to_none(dto.review.as_deref().map(collapse_whitespace)),
            ..dto
        };
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let job = self
            .jobs
            .find_by_id(dto.job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job '{}' not found", dto.job_id)))?;

        if job.posted_by != user.user_id {
            return Err(AppError::Forbidden(
                "Only the homeowner who posted the job can rate it".to_string(),
            ));
        }
        if job.status != JobStatus::Completed {
            return Err(AppError::BadRequest(
                "Only completed jobs can be rated".to_string(),
            ));
        }
        if job.assigned_provider_id != Some(dto.provider_id) {
            return Err(AppError::Validation(
                "Provider was not assigned to this job".to_string(),
            ));
        }

        let rating = self
            .ratings
            .insert(NewRating {
                homeowner_id: user.user_id,
                provider_id: dto.provider_id,
                job_id: job.id,
                rating: dto.rating,
                review: dto.review,
            })
            .await?;

        tracing::info!(
            "Job {} rated {} for provider {}",
            job.id,
            rating.rating,
            rating.provider_id
        );
        Ok(rating.into())
    }

    pub async fn summary(&self, provider_id: Uuid) -> Result<RatingSummary> {
        Ok(self
            .summaries(&[provider_id])
            .await?
            .remove(&provider_id)
            .unwrap_or_default())
    }

    /// Summaries for many providers from one aggregate query; every requested id is present
    pub async fn summaries(&self, provider_ids: &[Uuid]) -> Result<HashMap<Uuid, RatingSummary>> {
        let mut summaries: HashMap<Uuid, RatingSummary> = provider_ids
            .iter()
            .map(|id| (*id, RatingSummary::default()))
            .collect();

        for stats in self.ratings.stats_for_providers(provider_ids).await? {
            summaries.insert(stats.provider_id, stats.into());
        }
        Ok(summaries)
    }

    /// Ratings received by a provider, newest first
    pub async fn reviews(&self, provider_id: Uuid) -> Result<Vec<RatingResponseDto>> {
        let ratings = self.ratings.list_by_provider(provider_id).await?;
        Ok(ratings.into_iter().map(Into::into).collect())
    }

    pub async fn for_provider(&self, provider_id: Uuid) -> Result<ProviderRatingsDto> {
        Ok(ProviderRatingsDto {
            provider_id,
            summary: self.summary(provider_id).await?,
            reviews: self.reviews(provider_id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::roles::Role;
    use crate::shared::test_helpers::InMemoryStore;
    use tokio_test::assert_ok;

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: RatingService,
        homeowner: AuthenticatedUser,
        provider: AuthenticatedUser,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let service = RatingService::new(store.clone(), store.clone());
        let homeowner = store.add_user(Role::Homeowner);
        let provider = store.add_provider("Plumbing");
        Fixture {
            store,
            service,
            homeowner,
            provider,
        }
    }

    fn rating(job_id: Uuid, provider_id: Uuid, rating: i16, review: Option<&str>) -> SubmitRatingDto {
        SubmitRatingDto {
            job_id,
            provider_id,
            rating,
            review: review.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_rating_a_completed_job() {
        let f = fixture();
        let job = f.store.add_job(
            f.homeowner.user_id,
            "Plumbing",
            JobStatus::Completed,
            Some(f.provider.user_id),
        );

        let created = assert_ok!(
            f.service
                .submit(
                    &f.homeowner,
                    rating(job.id, f.provider.user_id, 5, Some("  Great   work ")),
                )
                .await
        );
        assert_eq!(created.review.as_deref(), Some("Great work"));

        let summary = assert_ok!(f.service.summary(f.provider.user_id).await);
        assert_eq!(summary, RatingSummary::new(5.0, 1));
    }

    #[tokio::test]
    async fn test_blank_review_is_stored_as_none() {
        let f = fixture();
        let job = f.store.add_job(
            f.homeowner.user_id,
            "Plumbing",
            JobStatus::Completed,
            Some(f.provider.user_id),
        );

        let created = assert_ok!(
            f.service
                .submit(&f.homeowner, rating(job.id, f.provider.user_id, 4, Some("   ")))
                .await
        );
        assert_eq!(created.review, None);
    }

    #[tokio::test]
    async fn test_second_rating_for_job_conflicts() {
        let f = fixture();
        let job = f.store.add_job(
            f.homeowner.user_id,
            "Plumbing",
            JobStatus::Completed,
            Some(f.provider.user_id),
        );

        assert_ok!(
            f.service
                .submit(&f.homeowner, rating(job.id, f.provider.user_id, 5, None))
                .await
        );
        let second = f
            .service
            .submit(&f.homeowner, rating(job.id, f.provider.user_id, 1, None))
            .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_concurrent_ratings_persist_exactly_one() {
        let f = fixture();
        let job = f.store.add_job(
            f.homeowner.user_id,
            "Plumbing",
            JobStatus::Completed,
            Some(f.provider.user_id),
        );

        let (a, b) = futures::join!(
            f.service
                .submit(&f.homeowner, rating(job.id, f.provider.user_id, 5, None)),
            f.service
                .submit(&f.homeowner, rating(job.id, f.provider.user_id, 3, None)),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(f.store.ratings_for_provider(f.provider.user_id).len(), 1);
    }

    #[tokio::test]
    async fn test_unfinished_job_cannot_be_rated() {
        let f = fixture();
        let job = f.store.add_job(
            f.homeowner.user_id,
            "Plumbing",
            JobStatus::InProgress,
            Some(f.provider.user_id),
        );

        let result = f
            .service
            .submit(&f.homeowner, rating(job.id, f.provider.user_id, 5, None))
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_only_owner_rates_only_assigned_provider() {
        let f = fixture();
        let job = f.store.add_job(
            f.homeowner.user_id,
            "Plumbing",
            JobStatus::Completed,
            Some(f.provider.user_id),
        );
        let stranger = f.store.add_user(Role::Homeowner);
        let other_provider = f.store.add_provider("Plumbing");

        let result = f
            .service
            .submit(&stranger, rating(job.id, f.provider.user_id, 5, None))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let result = f
            .service
            .submit(&f.homeowner, rating(job.id, other_provider.user_id, 5, None))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rating_out_of_range_is_rejected() {
        let f = fixture();
        let job = f.store.add_job(
            f.homeowner.user_id,
            "Plumbing",
            JobStatus::Completed,
            Some(f.provider.user_id),
        );

        for score in [0, 6] {
            let result = f
                .service
                .submit(&f.homeowner, rating(job.id, f.provider.user_id, score, None))
                .await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_summaries_cover_unrated_providers() {
        let f = fixture();
        let unrated = Uuid::new_v4();
        for score in [5, 4, 4] {
            let job = f.store.add_job(
                f.homeowner.user_id,
                "Plumbing",
                JobStatus::Completed,
                Some(f.provider.user_id),
            );
            assert_ok!(
                f.service
                    .submit(&f.homeowner, rating(job.id, f.provider.user_id, score, None))
                    .await
            );
        }

        let summaries = assert_ok!(f.service.summaries(&[f.provider.user_id, unrated]).await);
        assert_eq!(summaries[&f.provider.user_id], RatingSummary::new(13.0 / 3.0, 3));
        assert_eq!(summaries[&f.provider.user_id].average, 4.3);
        assert_eq!(summaries[&unrated], RatingSummary::default());

        let detail = assert_ok!(f.service.for_provider(f.provider.user_id).await);
        assert_eq!(detail.reviews.len(), 3);
        assert!(detail
            .reviews
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));
    }
}
