use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::ratings::models::{NewRating, ProviderRating, RatingStats};

const RATING_COLUMNS: &str =
    "id, homeowner_id, provider_id, job_id, rating, review, created_at";

/// Data access for the `provider_ratings` table
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert a rating; a second rating for the same job is a `Conflict`
    async fn insert(&self, rating: NewRating) -> Result<ProviderRating>;

    /// Ratings received by a provider, newest first
    async fn list_by_provider(&self, provider_id: Uuid) -> Result<Vec<ProviderRating>>;

    /// Aggregates for many providers in one query; providers without ratings are absent
    async fn stats_for_providers(&self, provider_ids: &[Uuid]) -> Result<Vec<RatingStats>>;

    async fn count(&self) -> Result<i64>;
}

pub struct PgRatingRepository {
    pool: PgPool,
}

impl PgRatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for PgRatingRepository {
    async fn insert(&self, rating: NewRating) -> Result<ProviderRating> {
        sqlx::query_as::<_, ProviderRating>(&format!(
            r#"
            INSERT INTO provider_ratings (homeowner_id, provider_id, job_id, rating, review)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            RATING_COLUMNS
        ))
        .bind(rating.homeowner_id)
        .bind(rating.provider_id)
        .bind(rating.job_id)
        .bind(rating.rating)
        .bind(&rating.review)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "Job has already been rated"))
    }

    async fn list_by_provider(&self, provider_id: Uuid) -> Result<Vec<ProviderRating>> {
        sqlx::query_as::<_, ProviderRating>(&format!(
            "SELECT {} FROM provider_ratings WHERE provider_id = $1 ORDER BY created_at DESC",
            RATING_COLUMNS
        ))
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list ratings for {}: {:?}", provider_id, e);
            AppError::Database(e)
        })
    }

    async fn stats_for_providers(&self, provider_ids: &[Uuid]) -> Result<Vec<RatingStats>> {
        if provider_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, RatingStats>(
            r#"
            SELECT provider_id, AVG(rating)::float8 AS average, COUNT(*) AS count
            FROM provider_ratings
            WHERE provider_id = ANY($1)
            GROUP BY provider_id
            "#,
        )
        .bind(provider_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to aggregate ratings: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM provider_ratings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count ratings: {:?}", e);
                AppError::Database(e)
            })
    }
}
