use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for `provider_profiles`
#[derive(Debug, Clone, FromRow)]
pub struct ProviderProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub skill_category_id: Uuid,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile written at provider sign-up
#[derive(Debug, Clone)]
pub struct NewProviderProfile {
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub skill_category_id: Uuid,
}

/// Editable profile fields (settings screen)
#[derive(Debug, Clone)]
pub struct ProviderProfileChanges {
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub skill_category_id: Uuid,
    pub bio: Option<String>,
}

/// Discovery filters; an absent filter matches every provider
#[derive(Debug, Clone, Default)]
pub struct ProviderSearch {
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring of the city
    pub city: Option<String>,
    /// Case-insensitive substring of the name, bio, city or category name
    pub keyword: Option<String>,
}
