use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::providers::models::{
    NewProviderProfile, ProviderProfile, ProviderProfileChanges, ProviderSearch,
};

const PROFILE_COLUMNS: &str = "id, user_id, full_name, phone, city, skill_category_id, bio, \
                               profile_image_url, created_at, updated_at";

/// Data access for the `provider_profiles` table
#[async_trait]
pub trait ProviderProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<ProviderProfile>>;

    /// Batched lookup used when decorating offers and listings
    async fn find_by_user_ids(&self, user_ids: &[Uuid]) -> Result<Vec<ProviderProfile>>;

    async fn insert(&self, profile: NewProviderProfile) -> Result<ProviderProfile>;

    async fn update(
        &self,
        user_id: Uuid,
        changes: ProviderProfileChanges,
    ) -> Result<Option<ProviderProfile>>;

    async fn set_profile_image(
        &self,
        user_id: Uuid,
        url: Option<&str>,
    ) -> Result<Option<ProviderProfile>>;

    /// Providers matching every given filter, ordered by name
    async fn search(&self, filter: &ProviderSearch) -> Result<Vec<ProviderProfile>>;
}

pub struct PgProviderProfileRepository {
    pool: PgPool,
}

impl PgProviderProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `ILIKE` wildcards so user input matches literally
fn like_pattern(input: &str) -> String {
    let escaped = input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ProviderProfileRepository for PgProviderProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<ProviderProfile>> {
        sqlx::query_as::<_, ProviderProfile>(&format!(
            "SELECT {} FROM provider_profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get provider profile {}: {:?}", user_id, e);
            AppError::Database(e)
        })
    }

    async fn find_by_user_ids(&self, user_ids: &[Uuid]) -> Result<Vec<ProviderProfile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, ProviderProfile>(&format!(
            "SELECT {} FROM provider_profiles WHERE user_id = ANY($1)",
            PROFILE_COLUMNS
        ))
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load provider profiles: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn insert(&self, profile: NewProviderProfile) -> Result<ProviderProfile> {
        sqlx::query_as::<_, ProviderProfile>(&format!(
            r#"
            INSERT INTO provider_profiles (user_id, full_name, phone, city, skill_category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(profile.user_id)
        .bind(&profile.full_name)
        .bind(&profile.phone)
        .bind(&profile.city)
        .bind(profile.skill_category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "Provider profile already exists"))
    }

    async fn update(
        &self,
        user_id: Uuid,
        changes: ProviderProfileChanges,
    ) -> Result<Option<ProviderProfile>> {
        sqlx::query_as::<_, ProviderProfile>(&format!(
            r#"
            UPDATE provider_profiles
            SET full_name = $2, phone = $3, city = $4, skill_category_id = $5, bio = $6,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(&changes.full_name)
        .bind(&changes.phone)
        .bind(&changes.city)
        .bind(changes.skill_category_id)
        .bind(&changes.bio)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "Category does not exist"))
    }

    async fn set_profile_image(
        &self,
        user_id: Uuid,
        url: Option<&str>,
    ) -> Result<Option<ProviderProfile>> {
        sqlx::query_as::<_, ProviderProfile>(&format!(
            r#"
            UPDATE provider_profiles
            SET profile_image_url = $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to set profile image for {}: {:?}", user_id, e);
            AppError::Database(e)
        })
    }

    async fn search(&self, filter: &ProviderSearch) -> Result<Vec<ProviderProfile>> {
        sqlx::query_as::<_, ProviderProfile>(&format!(
            r#"
            SELECT {}
            FROM provider_profiles
            WHERE ($1::uuid IS NULL OR skill_category_id = $1)
              AND ($2::text IS NULL OR city ILIKE $2)
              AND ($3::text IS NULL
                   OR full_name ILIKE $3
                   OR bio ILIKE $3
                   OR city ILIKE $3
                   OR skill_category_id IN (
                       SELECT id FROM service_categories WHERE name ILIKE $3
                   ))
            ORDER BY full_name
            "#,
            PROFILE_COLUMNS
        ))
        .bind(filter.category_id)
        .bind(filter.city.as_deref().map(like_pattern))
        .bind(filter.keyword.as_deref().map(like_pattern))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search providers: {:?}", e);
            AppError::Database(e)
        })
    }
}
