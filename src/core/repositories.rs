use std::sync::Arc;

use sqlx::PgPool;

use crate::features::accounts::repositories::{
    AccountDeletionRepository, PgAccountDeletionRepository,
};
use crate::features::categories::repositories::{CategoryRepository, PgCategoryRepository};
use crate::features::homeowners::repositories::{
    HomeownerProfileRepository, PgHomeownerProfileRepository,
};
use crate::features::jobs::repositories::{JobRepository, PgJobRepository};
use crate::features::offers::repositories::{OfferRepository, PgOfferRepository};
use crate::features::providers::repositories::{
    PgProviderProfileRepository, ProviderProfileRepository,
};
use crate::features::ratings::repositories::{PgRatingRepository, RatingRepository};
use crate::features::roles::{PgUserRoleRepository, UserRoleRepository};

/// One handle per table, shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub roles: Arc<dyn UserRoleRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub providers: Arc<dyn ProviderProfileRepository>,
    pub homeowners: Arc<dyn HomeownerProfileRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub deletions: Arc<dyn AccountDeletionRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            roles: Arc::new(PgUserRoleRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            providers: Arc::new(PgProviderProfileRepository::new(pool.clone())),
            homeowners: Arc::new(PgHomeownerProfileRepository::new(pool.clone())),
            jobs: Arc::new(PgJobRepository::new(pool.clone())),
            offers: Arc::new(PgOfferRepository::new(pool.clone())),
            ratings: Arc::new(PgRatingRepository::new(pool.clone())),
            deletions: Arc::new(PgAccountDeletionRepository::new(pool)),
        }
    }
}
