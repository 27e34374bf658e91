use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::jobs::models::Job;
use crate::features::offers::models::{AcceptedOffer, NewOffer, Offer, OfferStatus};

const OFFER_COLUMNS: &str =
    "id, job_id, provider_id, message, proposed_rate, status, created_at, updated_at";

/// Data access for the `job_requests` table
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Insert a pending offer if the job is still open and not posted by the provider.
    ///
    /// `None` when the job is gone, closed, or the provider's own. A second offer by
    /// the same provider on the same job is a `Conflict`.
    async fn insert_for_open_job(&self, offer: NewOffer) -> Result<Option<Offer>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Offer>>;

    /// Offers on a job, newest first
    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Offer>>;

    /// Offers made by a provider, newest first
    async fn list_by_provider(&self, provider_id: Uuid) -> Result<Vec<Offer>>;

    /// Accept one offer atomically.
    ///
    /// In one transaction: the job moves `open -> assigned` with the offer's
    /// provider recorded, the offer becomes `accepted` and every other pending
    /// offer on the job becomes `rejected`. A job that is no longer open, or an
    /// offer that is no longer pending, is a `Conflict` and nothing is written.
    async fn accept(&self, offer_id: Uuid) -> Result<AcceptedOffer>;

    async fn count(&self) -> Result<i64>;
}

pub struct PgOfferRepository {
    pool: PgPool,
}

impl PgOfferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        AppError::Database(e)
    }
}

#[async_trait]
impl OfferRepository for PgOfferRepository {
    async fn insert_for_open_job(&self, offer: NewOffer) -> Result<Option<Offer>> {
        // FOR SHARE waits out a concurrent acceptance and then re-checks `status = 'open'`
        sqlx::query_as::<_, Offer>(&format!(
            r#"
            INSERT INTO job_requests (job_id, provider_id, message, proposed_rate)
            SELECT j.id, $2, $3, $4
            FROM jobs j
            WHERE j.id = $1 AND j.status = 'open' AND j.posted_by <> $2
            FOR SHARE
            RETURNING {}
            "#,
            OFFER_COLUMNS
        ))
        .bind(offer.job_id)
        .bind(offer.provider_id)
        .bind(&offer.message)
        .bind(offer.proposed_rate)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "You have already submitted an offer for this job"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Offer>> {
        sqlx::query_as::<_, Offer>(&format!(
            "SELECT {} FROM job_requests WHERE id = $1",
            OFFER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to get offer"))
    }

    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Offer>> {
        sqlx::query_as::<_, Offer>(&format!(
            "SELECT {} FROM job_requests WHERE job_id = $1 ORDER BY created_at DESC",
            OFFER_COLUMNS
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list offers for job"))
    }

    async fn list_by_provider(&self, provider_id: Uuid) -> Result<Vec<Offer>> {
        sqlx::query_as::<_, Offer>(&format!(
            "SELECT {} FROM job_requests WHERE provider_id = $1 ORDER BY created_at DESC",
            OFFER_COLUMNS
        ))
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list offers for provider"))
    }

    async fn accept(&self, offer_id: Uuid) -> Result<AcceptedOffer> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let job_id: Uuid = sqlx::query_scalar("SELECT job_id FROM job_requests WHERE id = $1")
            .bind(offer_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to look up offer"))?
            .ok_or_else(|| AppError::NotFound(format!("Offer '{}' not found", offer_id)))?;

        // Lock order is job, then offer, for every acceptance on the same job
        sqlx::query("SELECT id FROM jobs WHERE id = $1 FOR UPDATE")
            .bind(job_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to lock job"))?;

        let offer = sqlx::query_as::<_, Offer>(&format!(
            "SELECT {} FROM job_requests WHERE id = $1 FOR UPDATE",
            OFFER_COLUMNS
        ))
        .bind(offer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock offer"))?
        .ok_or_else(|| AppError::NotFound(format!("Offer '{}' not found", offer_id)))?;

        if offer.status != OfferStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Offer is already {}",
                offer.status
            )));
        }

        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = 'assigned', assigned_provider_id = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'open'
            RETURNING id, posted_by, title, category_id, description, budget, city,
                      date_time, status, assigned_provider_id, created_at, updated_at
            "#,
        )
        .bind(job_id)
        .bind(offer.provider_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to assign job"))?
        .ok_or_else(|| AppError::Conflict("Job is no longer open for offers".to_string()))?;

        let offer = sqlx::query_as::<_, Offer>(&format!(
            r#"
            UPDATE job_requests
            SET status = 'accepted', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            OFFER_COLUMNS
        ))
        .bind(offer_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_constraint(e, "Job already has an accepted offer"))?;

        let rejected_offer_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE job_requests
            SET status = 'rejected', updated_at = NOW()
            WHERE job_id = $1 AND id <> $2 AND status = 'pending'
            RETURNING id
            "#,
        )
        .bind(job_id)
        .bind(offer_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to reject sibling offers"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit offer acceptance"))?;

        Ok(AcceptedOffer {
            job,
            offer,
            rejected_offer_ids,
        })
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM job_requests")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count offers"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::jobs::models::NewJob;
    use crate::features::jobs::repositories::{JobRepository, PgJobRepository};
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    async fn open_job(pool: &PgPool) -> Job {
        let category_id: Uuid =
            sqlx::query_scalar("SELECT id FROM service_categories WHERE slug = 'plumbing'")
                .fetch_one(pool)
                .await
                .unwrap();
        PgJobRepository::new(pool.clone())
            .insert_rate_limited(
                NewJob {
                    posted_by: Uuid::new_v4(),
                    title: "Fix leaking sink".to_string(),
                    category_id,
                    description: "Water under the kitchen sink".to_string(),
                    budget: None,
                    city: "Austin".to_string(),
                    date_time: None,
                },
                Utc::now() - Duration::hours(24),
                5,
            )
            .await
            .unwrap()
    }

    fn offer_on(job: &Job, rate: i64) -> NewOffer {
        NewOffer {
            job_id: job.id,
            provider_id: Uuid::new_v4(),
            message: "I can do it tomorrow".to_string(),
            proposed_rate: Decimal::new(rate, 0),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_concurrent_accepts_assign_the_job_once(pool: PgPool) {
        let repo = PgOfferRepository::new(pool.clone());
        let job = open_job(&pool).await;
        let first = repo.insert_for_open_job(offer_on(&job, 80)).await.unwrap().unwrap();
        let second = repo.insert_for_open_job(offer_on(&job, 95)).await.unwrap().unwrap();

        let (a, b) = tokio::join!(repo.accept(first.id), repo.accept(second.id));

        let (winner, loser) = match (a, b) {
            (Ok(won), Err(lost)) => (won, lost),
            (Err(lost), Ok(won)) => (won, lost),
            other => panic!("expected exactly one acceptance, got {:?}", other),
        };
        assert!(matches!(loser, AppError::Conflict(_)));
        assert_eq!(winner.job.assigned_provider_id, Some(winner.offer.provider_id));

        let offers = repo.list_by_job(job.id).await.unwrap();
        let accepted: Vec<&Offer> = offers
            .iter()
            .filter(|o| o.status == OfferStatus::Accepted)
            .collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id, winner.offer.id);
        assert!(offers
            .iter()
            .filter(|o| o.id != winner.offer.id)
            .all(|o| o.status == OfferStatus::Rejected));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_offer_after_acceptance_is_refused(pool: PgPool) {
        let repo = PgOfferRepository::new(pool.clone());
        let job = open_job(&pool).await;
        let offer = repo.insert_for_open_job(offer_on(&job, 60)).await.unwrap().unwrap();
        repo.accept(offer.id).await.unwrap();

        assert!(repo.insert_for_open_job(offer_on(&job, 50)).await.unwrap().is_none());
        let duplicate = NewOffer {
            provider_id: offer.provider_id,
            ..offer_on(&job, 70)
        };
        assert!(repo.insert_for_open_job(duplicate).await.unwrap().is_none());
    }
}
