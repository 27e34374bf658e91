use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for `homeowner_profiles`
#[derive(Debug, Clone, FromRow)]
pub struct HomeownerProfile {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact fields written at sign-up and from the settings screen
#[derive(Debug, Clone, Default)]
pub struct HomeownerProfileChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}
