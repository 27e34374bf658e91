use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::ServiceCategory;

/// Data access for the `service_categories` table
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<ServiceCategory>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceCategory>>;

    /// Insert a category; a duplicate name or slug is a `Conflict`
    async fn insert(
        &self,
        name: &str,
        slug: &str,
        description: Option<&str>,
    ) -> Result<ServiceCategory>;

    /// Delete a category. Fails with `Conflict` while jobs or profiles reference it.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self) -> Result<Vec<ServiceCategory>> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM service_categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceCategory>> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM service_categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn insert(
        &self,
        name: &str,
        slug: &str,
        description: Option<&str>,
    ) -> Result<ServiceCategory> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            INSERT INTO service_categories (name, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, description, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "A category with this name already exists"))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM service_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_constraint(e, "Category is in use by jobs or provider profiles")
            })?;

        Ok(result.rows_affected() > 0)
    }
}
