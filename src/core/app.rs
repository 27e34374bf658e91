use std::sync::Arc;

use axum::Router;

use crate::core::config::MarketplaceConfig;
use crate::core::repositories::Repositories;
use crate::features::accounts::{routes as accounts_routes, AccountService};
use crate::features::admin::{routes as admin_routes, AdminRepositories, AdminService};
use crate::features::auth::clients::IdentityProvider;
use crate::features::auth::{routes as auth_routes, AuthService};
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::homeowners::{routes as homeowners_routes, HomeownerService};
use crate::features::jobs::{routes as jobs_routes, JobService};
use crate::features::offers::{routes as offers_routes, OfferService};
use crate::features::providers::{routes as providers_routes, ProviderService};
use crate::features::ratings::{routes as ratings_routes, RatingService};
use crate::modules::storage::{ObjectStorage, ProfileImages};

/// Every feature service, wired to one set of repositories and collaborators
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub categories: Arc<CategoryService>,
    pub providers: Arc<ProviderService>,
    pub homeowners: Arc<HomeownerService>,
    pub jobs: Arc<JobService>,
    pub offers: Arc<OfferService>,
    pub ratings: Arc<RatingService>,
    pub accounts: Arc<AccountService>,
    pub admin: Arc<AdminService>,
    max_image_bytes: usize,
}

impl AppServices {
    pub fn new(
        repos: Repositories,
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn ObjectStorage>,
        marketplace: MarketplaceConfig,
    ) -> Self {
        let max_image_bytes = marketplace.profile_image_max_bytes;
        let images = Arc::new(ProfileImages::new(storage, max_image_bytes));

        let categories = Arc::new(CategoryService::new(repos.categories.clone()));
        let ratings = Arc::new(RatingService::new(
            repos.ratings.clone(),
            repos.jobs.clone(),
        ));
        let providers = Arc::new(ProviderService::new(
            repos.providers.clone(),
            Arc::clone(&categories),
            Arc::clone(&ratings),
            Arc::clone(&images),
        ));
        let homeowners = Arc::new(HomeownerService::new(
            repos.homeowners.clone(),
            Arc::clone(&images),
        ));
        let jobs = Arc::new(JobService::new(
            repos.jobs.clone(),
            repos.providers.clone(),
            Arc::clone(&categories),
            marketplace,
        ));
        let offers = Arc::new(OfferService::new(
            repos.offers.clone(),
            repos.jobs.clone(),
            repos.providers.clone(),
            Arc::clone(&ratings),
        ));
        let accounts = Arc::new(AccountService::new(
            repos.deletions.clone(),
            repos.roles.clone(),
            images,
            Arc::clone(&identity),
        ));
        let auth = Arc::new(AuthService::new(
            Arc::clone(&identity),
            repos.roles.clone(),
            repos.providers.clone(),
            repos.homeowners.clone(),
            Arc::clone(&categories),
        ));
        let admin = Arc::new(AdminService::new(
            AdminRepositories {
                roles: repos.roles,
                providers: repos.providers,
                jobs: repos.jobs,
                offers: repos.offers,
                ratings: repos.ratings,
            },
            identity,
            Arc::clone(&jobs),
            Arc::clone(&categories),
            Arc::clone(&accounts),
        ));

        Self {
            auth,
            categories,
            providers,
            homeowners,
            jobs,
            offers,
            ratings,
            accounts,
            admin,
            max_image_bytes,
        }
    }

    /// Routes that need no bearer token
    pub fn public_routes(&self) -> Router {
        Router::new()
            .merge(auth_routes::public_routes(Arc::clone(&self.auth)))
            .merge(categories_routes::routes(Arc::clone(&self.categories)))
    }

    /// Routes that expect an `AuthenticatedUser`; the caller layers the auth middleware on top
    pub fn protected_routes(&self) -> Router {
        Router::new()
            .merge(auth_routes::protected_routes(Arc::clone(&self.auth)))
            .merge(providers_routes::routes(
                Arc::clone(&self.providers),
                self.max_image_bytes,
            ))
            .merge(homeowners_routes::routes(
                Arc::clone(&self.homeowners),
                self.max_image_bytes,
            ))
            .merge(jobs_routes::routes(Arc::clone(&self.jobs)))
            .merge(offers_routes::routes(Arc::clone(&self.offers)))
            .merge(ratings_routes::routes(Arc::clone(&self.ratings)))
            .merge(accounts_routes::routes(Arc::clone(&self.accounts)))
            .nest("/api/admin", admin_routes::routes(Arc::clone(&self.admin)))
    }
}
