use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::jobs::models::{Job, JobChanges, JobStatus, NewJob};

const JOB_COLUMNS: &str = "id, posted_by, title, category_id, description, budget, city, \
                           date_time, status, assigned_provider_id, created_at, updated_at";

/// Data access for the `jobs` table
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a job unless the owner already has `max_open` open jobs created since `window_start`.
    ///
    /// Count and insert are serialised per owner, so concurrent posts cannot both pass the check.
    async fn insert_rate_limited(
        &self,
        job: NewJob,
        window_start: DateTime<Utc>,
        max_open: i64,
    ) -> Result<Job>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Job>>;

    /// Edit a job only while it is open and owned by `owner`
    async fn update_open(&self, id: Uuid, owner: Uuid, changes: JobChanges) -> Result<Option<Job>>;

    /// Compare-and-swap the status; `None` when the job is no longer in `from`
    async fn transition_status(&self, id: Uuid, from: JobStatus, to: JobStatus)
        -> Result<Option<Job>>;

    /// Delete the job if its current status is one of `allowed`
    async fn delete_in_status(&self, id: Uuid, allowed: &[JobStatus]) -> Result<bool>;

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Job>>;

    /// Open jobs in a category, newest first, excluding one poster's own jobs
    async fn list_open_in_category(&self, category_id: Uuid, exclude_owner: Uuid)
        -> Result<Vec<Job>>;

    /// Jobs assigned to a provider that are not finished yet
    async fn list_active_for_provider(&self, provider_id: Uuid) -> Result<Vec<Job>>;

    /// Newest-first page of every job, with the total count
    async fn list_page(&self, offset: i64, limit: i64) -> Result<(Vec<Job>, i64)>;

    async fn count_by_status(&self) -> Result<Vec<(JobStatus, i64)>>;
}

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_names(statuses: &[JobStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn insert_rate_limited(
        &self,
        job: NewJob,
        window_start: DateTime<Utc>,
        max_open: i64,
    ) -> Result<Job> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        // Serialise posts by the same owner for the rest of the transaction
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(job.posted_by.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to acquire posting lock: {:?}", e);
                AppError::Database(e)
            })?;

        let recent_open: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM jobs
            WHERE posted_by = $1 AND status = 'open' AND created_at >= $2
            "#,
        )
        .bind(job.posted_by)
        .bind(window_start)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count recent jobs: {:?}", e);
            AppError::Database(e)
        })?;

        if recent_open >= max_open {
            return Err(AppError::RateLimitExceeded(format!(
                "You can have at most {} open jobs posted within the rate limit window",
                max_open
            )));
        }

        let created = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (posted_by, title, category_id, description, budget, city, date_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job.posted_by)
        .bind(&job.title)
        .bind(job.category_id)
        .bind(&job.description)
        .bind(&job.budget)
        .bind(&job.city)
        .bind(job.date_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_constraint(e, "Category does not exist"))?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit job insert: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>> {
        sqlx::query_as::<_, Job>(&format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get job {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Job>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE id = ANY($1)",
            JOB_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load jobs: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update_open(&self, id: Uuid, owner: Uuid, changes: JobChanges) -> Result<Option<Job>> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET title = $3, category_id = $4, description = $5, budget = $6, city = $7,
                date_time = $8, updated_at = NOW()
            WHERE id = $1 AND posted_by = $2 AND status = 'open'
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .bind(&changes.title)
        .bind(changes.category_id)
        .bind(&changes.description)
        .bind(&changes.budget)
        .bind(&changes.city)
        .bind(changes.date_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "Category does not exist"))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update status of job {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn delete_in_status(&self, id: Uuid, allowed: &[JobStatus]) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND status::text = ANY($2)")
            .bind(id)
            .bind(status_names(allowed))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete job {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Job>> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE posted_by = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list jobs for {}: {:?}", owner, e);
            AppError::Database(e)
        })
    }

    async fn list_open_in_category(
        &self,
        category_id: Uuid,
        exclude_owner: Uuid,
    ) -> Result<Vec<Job>> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {}
            FROM jobs
            WHERE status = 'open' AND category_id = $1 AND posted_by <> $2
            ORDER BY created_at DESC
            "#,
            JOB_COLUMNS
        ))
        .bind(category_id)
        .bind(exclude_owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list open jobs: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_active_for_provider(&self, provider_id: Uuid) -> Result<Vec<Job>> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {}
            FROM jobs
            WHERE assigned_provider_id = $1 AND status IN ('assigned', 'in_progress')
            ORDER BY updated_at DESC
            "#,
            JOB_COLUMNS
        ))
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list assigned jobs: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_page(&self, offset: i64, limit: i64) -> Result<(Vec<Job>, i64)> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            JOB_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list jobs: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count jobs: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((jobs, total))
    }

    async fn count_by_status(&self) -> Result<Vec<(JobStatus, i64)>> {
        sqlx::query_as::<_, (JobStatus, i64)>(
            "SELECT status, COUNT(*) FROM jobs GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count jobs by status: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn new_job(pool: &PgPool, owner: Uuid, title: &str) -> NewJob {
        let category_id: Uuid =
            sqlx::query_scalar("SELECT id FROM service_categories WHERE slug = 'cleaning'")
                .fetch_one(pool)
                .await
                .unwrap();
        NewJob {
            posted_by: owner,
            title: title.to_string(),
            category_id,
            description: "Two bedroom apartment".to_string(),
            budget: Some("$120".to_string()),
            city: "Denver".to_string(),
            date_time: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_concurrent_posts_respect_open_job_cap(pool: PgPool) {
        let repo = PgJobRepository::new(pool.clone());
        let owner = Uuid::new_v4();
        let window_start = Utc::now() - Duration::hours(24);

        let mut posts = Vec::new();
        for i in 0..6 {
            let job = new_job(&pool, owner, &format!("Move-out clean {}", i)).await;
            posts.push(repo.insert_rate_limited(job, window_start, 3));
        }
        let results = futures::future::join_all(posts).await;

        let created = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(created, 3);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, AppError::RateLimitExceeded(_))));
        assert_eq!(repo.list_by_owner(owner).await.unwrap().len(), 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_status_transition_is_compare_and_swap(pool: PgPool) {
        let repo = PgJobRepository::new(pool.clone());
        let job = repo
            .insert_rate_limited(
                new_job(&pool, Uuid::new_v4(), "Window cleaning").await,
                Utc::now() - Duration::hours(24),
                5,
            )
            .await
            .unwrap();

        let cancelled = repo
            .transition_status(job.id, JobStatus::Open, JobStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.map(|j| j.status), Some(JobStatus::Cancelled));
        assert!(repo
            .transition_status(job.id, JobStatus::Open, JobStatus::Cancelled)
            .await
            .unwrap()
            .is_none());
    }
}
