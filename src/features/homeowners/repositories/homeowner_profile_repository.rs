use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::homeowners::models::{HomeownerProfile, HomeownerProfileChanges};

const PROFILE_COLUMNS: &str =
    "user_id, full_name, phone, city, profile_image_url, created_at, updated_at";

/// Data access for the `homeowner_profiles` table.
///
/// Writes create the row on first use, so a homeowner whose row is missing
/// can still save settings.
#[async_trait]
pub trait HomeownerProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<HomeownerProfile>>;

    /// Overwrite the contact fields; the picture is kept
    async fn upsert(
        &self,
        user_id: Uuid,
        changes: HomeownerProfileChanges,
    ) -> Result<HomeownerProfile>;

    async fn set_profile_image(&self, user_id: Uuid, url: Option<&str>)
        -> Result<HomeownerProfile>;
}

pub struct PgHomeownerProfileRepository {
    pool: PgPool,
}

impl PgHomeownerProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HomeownerProfileRepository for PgHomeownerProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<HomeownerProfile>> {
        sqlx::query_as::<_, HomeownerProfile>(&format!(
            "SELECT {} FROM homeowner_profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get homeowner profile {}: {:?}", user_id, e);
            AppError::Database(e)
        })
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        changes: HomeownerProfileChanges,
    ) -> Result<HomeownerProfile> {
        sqlx::query_as::<_, HomeownerProfile>(&format!(
            r#"
            INSERT INTO homeowner_profiles (user_id, full_name, phone, city)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                phone = EXCLUDED.phone,
                city = EXCLUDED.city,
                updated_at = NOW()
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(&changes.full_name)
        .bind(&changes.phone)
        .bind(&changes.city)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save homeowner profile {}: {:?}", user_id, e);
            AppError::Database(e)
        })
    }

    async fn set_profile_image(
        &self,
        user_id: Uuid,
        url: Option<&str>,
    ) -> Result<HomeownerProfile> {
        sqlx::query_as::<_, HomeownerProfile>(&format!(
            r#"
            INSERT INTO homeowner_profiles (user_id, profile_image_url)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET profile_image_url = EXCLUDED.profile_image_url,
                updated_at = NOW()
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to set homeowner image for {}: {:?}", user_id, e);
            AppError::Database(e)
        })
    }
}
