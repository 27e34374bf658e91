use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::accounts::models::{AccountDeletion, DeletionStep, PurgedRows};
use crate::features::roles::Role;

const DELETION_COLUMNS: &str = "user_id, role, step, status, attempts, last_error";

/// Durable step log for account deletion, plus the transactional role-data purge
#[async_trait]
pub trait AccountDeletionRepository: Send + Sync {
    async fn find(&self, user_id: Uuid) -> Result<Option<AccountDeletion>>;

    /// Start a deletion, or return the existing one unchanged
    async fn begin(&self, user_id: Uuid, role: Option<Role>) -> Result<AccountDeletion>;

    /// Move the cursor from `from` to `to` after `from` succeeded.
    ///
    /// Returns `None` when the cursor is no longer at `from`, i.e. another
    /// run of the same deletion got there first.
    async fn advance(
        &self,
        user_id: Uuid,
        from: DeletionStep,
        to: DeletionStep,
    ) -> Result<Option<AccountDeletion>>;

    /// Record a failed attempt at the current step
    async fn record_failure(&self, user_id: Uuid, error: &str) -> Result<()>;

    async fn complete(&self, user_id: Uuid) -> Result<AccountDeletion>;

    /// Provider profile, offers made and ratings received, in one transaction.
    /// A settings row left from an earlier homeowner role goes too.
    async fn purge_provider_data(&self, user_id: Uuid) -> Result<PurgedRows>;

    /// Settings, posted jobs (offers on them cascade) and ratings given, in one transaction
    async fn purge_homeowner_data(&self, user_id: Uuid) -> Result<PurgedRows>;
}

pub struct PgAccountDeletionRepository {
    pool: PgPool,
}

impl PgAccountDeletionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountDeletionRepository for PgAccountDeletionRepository {
    async fn find(&self, user_id: Uuid) -> Result<Option<AccountDeletion>> {
        sqlx::query_as::<_, AccountDeletion>(&format!(
            "SELECT {} FROM account_deletions WHERE user_id = $1",
            DELETION_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load account deletion {}: {:?}", user_id, e);
            AppError::Database(e)
        })
    }

    async fn begin(&self, user_id: Uuid, role: Option<Role>) -> Result<AccountDeletion> {
        sqlx::query(
            r#"
            INSERT INTO account_deletions (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to start account deletion {}: {:?}", user_id, e);
            AppError::Database(e)
        })?;

        self.find(user_id).await?.ok_or_else(|| {
            AppError::Internal(format!("Account deletion for {} vanished", user_id))
        })
    }

    async fn advance(
        &self,
        user_id: Uuid,
        from: DeletionStep,
        to: DeletionStep,
    ) -> Result<Option<AccountDeletion>> {
        sqlx::query_as::<_, AccountDeletion>(&format!(
            r#"
            UPDATE account_deletions
            SET step = $3, last_error = NULL, updated_at = NOW()
            WHERE user_id = $1 AND step = $2 AND status = 'in_progress'
            RETURNING {}
            "#,
            DELETION_COLUMNS
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to advance account deletion {}: {:?}", user_id, e);
            AppError::Database(e)
        })
    }

    async fn record_failure(&self, user_id: Uuid, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE account_deletions
            SET attempts = attempts + 1, last_error = $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record deletion failure {}: {:?}", user_id, e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn complete(&self, user_id: Uuid) -> Result<AccountDeletion> {
        sqlx::query_as::<_, AccountDeletion>(&format!(
            r#"
            UPDATE account_deletions
            SET step = 'done', status = 'completed', last_error = NULL,
                completed_at = NOW(), updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            DELETION_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to complete account deletion {}: {:?}", user_id, e);
            AppError::Database(e)
        })
    }

    async fn purge_provider_data(&self, user_id: Uuid) -> Result<PurgedRows> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let mut profiles = 0;
        for table in ["provider_profiles", "homeowner_profiles"] {
            profiles += sqlx::query(&format!("DELETE FROM {} WHERE user_id = $1", table))
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?
                .rows_affected();
        }

        let offers = sqlx::query("DELETE FROM job_requests WHERE provider_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .rows_affected();

        let ratings = sqlx::query("DELETE FROM provider_ratings WHERE provider_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .rows_affected();

        tx.commit().await.map_err(AppError::Database)?;

        Ok(PurgedRows {
            profiles,
            jobs: 0,
            offers,
            ratings,
        })
    }

    async fn purge_homeowner_data(&self, user_id: Uuid) -> Result<PurgedRows> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let ratings = sqlx::query("DELETE FROM provider_ratings WHERE homeowner_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .rows_affected();

        let jobs = sqlx::query("DELETE FROM jobs WHERE posted_by = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .rows_affected();

        let profiles = sqlx::query("DELETE FROM homeowner_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .rows_affected();

        tx.commit().await.map_err(AppError::Database)?;

        Ok(PurgedRows {
            profiles,
            jobs,
            offers: 0,
            ratings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::accounts::models::DeletionStatus;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_racing_advances_move_the_cursor_once(pool: PgPool) {
        let repo = PgAccountDeletionRepository::new(pool);
        let user_id = Uuid::new_v4();
        let started = repo.begin(user_id, Some(Role::Homeowner)).await.unwrap();
        assert_eq!(started.step, DeletionStep::RemoveProfileImages);

        let from = DeletionStep::RemoveProfileImages;
        let (a, b) = tokio::join!(
            repo.advance(user_id, from, from.next()),
            repo.advance(user_id, from, from.next())
        );
        let moved = [a.unwrap(), b.unwrap()];
        assert_eq!(moved.iter().filter(|m| m.is_some()).count(), 1);

        repo.advance(user_id, DeletionStep::RemoveRoleData, DeletionStep::RemoveRole)
            .await
            .unwrap()
            .unwrap();
        // A run that still thinks it is at the first step must not rewind the cursor
        assert!(repo
            .advance(user_id, from, from.next())
            .await
            .unwrap()
            .is_none());
        let current = repo.find(user_id).await.unwrap().unwrap();
        assert_eq!(current.step, DeletionStep::RemoveRole);
        assert_eq!(current.status, DeletionStatus::InProgress);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_begin_twice_keeps_the_first_row(pool: PgPool) {
        let repo = PgAccountDeletionRepository::new(pool);
        let user_id = Uuid::new_v4();
        repo.begin(user_id, Some(Role::ServiceProvider)).await.unwrap();
        repo.record_failure(user_id, "storage unavailable").await.unwrap();

        let again = repo.begin(user_id, None).await.unwrap();
        assert_eq!(again.role, Some(Role::ServiceProvider));
        assert_eq!(again.attempts, 1);
        assert_eq!(again.last_error.as_deref(), Some("storage unavailable"));
    }
}
