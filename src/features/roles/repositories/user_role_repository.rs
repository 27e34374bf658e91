use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::roles::models::{Role, UserRoleRecord};

/// Data access for the `user_roles` table
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    async fn find_role(&self, user_id: Uuid) -> Result<Option<Role>>;

    /// Insert the role row written at sign-up. A second row for the same user is a `Conflict`.
    async fn insert(&self, user_id: Uuid, role: Role) -> Result<UserRoleRecord>;

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<Option<UserRoleRecord>>;

    /// Returns `true` when a row was removed
    async fn delete(&self, user_id: Uuid) -> Result<bool>;

    async fn list_all(&self) -> Result<Vec<UserRoleRecord>>;

    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>>;
}

pub struct PgUserRoleRepository {
    pool: PgPool,
}

impl PgUserRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRoleRepository for PgUserRoleRepository {
    async fn find_role(&self, user_id: Uuid) -> Result<Option<Role>> {
        sqlx::query_scalar::<_, Role>("SELECT role FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load role for user {}: {:?}", user_id, e);
                AppError::Database(e)
            })
    }

    async fn insert(&self, user_id: Uuid, role: Role) -> Result<UserRoleRecord> {
        sqlx::query_as::<_, UserRoleRecord>(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            RETURNING user_id, role
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "User already has a role"))
    }

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<Option<UserRoleRecord>> {
        sqlx::query_as::<_, UserRoleRecord>(
            r#"
            UPDATE user_roles
            SET role = $2
            WHERE user_id = $1
            RETURNING user_id, role
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update role for user {}: {:?}", user_id, e);
            AppError::Database(e)
        })
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete role for user {}: {:?}", user_id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<UserRoleRecord>> {
        sqlx::query_as::<_, UserRoleRecord>(
            "SELECT user_id, role FROM user_roles ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list user roles: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>> {
        sqlx::query_as::<_, (Role, i64)>(
            "SELECT role, COUNT(*) FROM user_roles GROUP BY role ORDER BY role",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count user roles: {:?}", e);
            AppError::Database(e)
        })
    }
}
