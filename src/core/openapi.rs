use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::accounts::{handlers as accounts_handlers, models as accounts_models};
use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::homeowners::{dtos as homeowners_dtos, handlers as homeowners_handlers};
use crate::features::jobs::{dtos as jobs_dtos, handlers as jobs_handlers, models as jobs_models};
use crate::features::offers::{
    dtos as offers_dtos, handlers as offers_handlers, models as offers_models,
};
use crate::features::providers::{dtos as providers_dtos, handlers as providers_handlers};
use crate::features::ratings::{
    dtos as ratings_dtos, handlers as ratings_handlers, models as ratings_models,
};
use crate::features::roles;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::sign_up_homeowner,
        auth::handlers::sign_up_provider,
        auth::handlers::login,
        auth::handlers::refresh_token,
        auth::handlers::get_me,
        auth::handlers::logout,
        auth::handlers::change_password,
        // Account
        accounts_handlers::delete_account,
        // Categories (public)
        categories_handlers::list_categories,
        categories_handlers::get_category,
        // Providers
        providers_handlers::search_providers,
        providers_handlers::get_provider,
        providers_handlers::get_my_profile,
        providers_handlers::update_my_profile,
        providers_handlers::upload_profile_image,
        // Homeowners
        homeowners_handlers::get_my_settings,
        homeowners_handlers::update_my_settings,
        homeowners_handlers::upload_my_image,
        // Jobs
        jobs_handlers::create_job,
        jobs_handlers::list_my_jobs,
        jobs_handlers::list_open_jobs,
        jobs_handlers::list_assigned_jobs,
        jobs_handlers::get_job,
        jobs_handlers::update_job,
        jobs_handlers::delete_job,
        jobs_handlers::update_job_status,
        // Offers
        offers_handlers::submit_offer,
        offers_handlers::list_job_offers,
        offers_handlers::list_my_offers,
        offers_handlers::accept_offer,
        // Ratings
        ratings_handlers::submit_rating,
        ratings_handlers::get_provider_ratings,
        // Admin
        admin_handlers::list_users,
        admin_handlers::change_user_role,
        admin_handlers::delete_user,
        admin_handlers::list_jobs,
        admin_handlers::set_job_status,
        admin_handlers::delete_job,
        admin_handlers::create_category,
        admin_handlers::delete_category,
        admin_handlers::get_stats,
    ),
    components(
        schemas(
            // Shared
            Meta,
            ApiResponse<jobs_dtos::JobResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<admin_dtos::AdminStatsDto>,
            roles::Role,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::SignUpHomeownerDto,
            auth::dtos::SignUpProviderDto,
            auth::dtos::SignUpResponseDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::RefreshTokenRequestDto,
            auth::dtos::ChangePasswordDto,
            auth::dtos::SessionDto,
            auth::dtos::AuthUserDto,
            auth::dtos::MeResponseDto,
            // Account
            accounts_models::DeletionStep,
            accounts_models::DeletionStatus,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CreateCategoryDto,
            // Providers
            providers_dtos::ProviderProfileDto,
            providers_dtos::UpdateProviderProfileDto,
            providers_dtos::UploadProfileImageDto,
            providers_dtos::ProviderSummaryDto,
            providers_dtos::ProviderDetailDto,
            // Homeowners
            homeowners_dtos::HomeownerProfileDto,
            homeowners_dtos::UpdateHomeownerProfileDto,
            // Jobs
            jobs_models::JobStatus,
            jobs_dtos::JobFieldsDto,
            jobs_dtos::UpdateJobStatusDto,
            jobs_dtos::JobResponseDto,
            // Offers
            offers_models::OfferStatus,
            offers_dtos::SubmitOfferDto,
            offers_dtos::OfferResponseDto,
            offers_dtos::OfferProviderDto,
            offers_dtos::JobOfferDto,
            offers_dtos::OfferJobSummaryDto,
            offers_dtos::MyOfferDto,
            offers_dtos::AcceptedOfferDto,
            // Ratings
            ratings_models::RatingSummary,
            ratings_dtos::SubmitRatingDto,
            ratings_dtos::RatingResponseDto,
            ratings_dtos::ProviderRatingsDto,
            // Admin
            admin_dtos::AdminUserDto,
            admin_dtos::ChangeRoleDto,
            admin_dtos::AdminRoleDto,
            admin_dtos::AdminJobDto,
            admin_dtos::RoleCountDto,
            admin_dtos::JobStatusCountDto,
            admin_dtos::AdminStatsDto,
        )
    ),
    tags(
        (name = "auth", description = "Sign-up, sessions and passwords"),
        (name = "account", description = "Account deletion"),
        (name = "categories", description = "Service categories (public)"),
        (name = "providers", description = "Service provider profiles and search"),
        (name = "homeowners", description = "Homeowner settings"),
        (name = "jobs", description = "Job postings and status changes"),
        (name = "offers", description = "Offers on jobs and acceptance"),
        (name = "ratings", description = "Provider ratings and reviews"),
        (name = "admin", description = "Admin moderation (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Genie Marketplace API",
        version = "0.1.0",
        description = "API documentation for the Genie home-services marketplace",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_marketplace_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/jobs",
            "/api/jobs/{id}/status",
            "/api/jobs/{id}/offers",
            "/api/offers/{id}/accept",
            "/api/ratings",
            "/api/account",
            "/api/homeowners/me/image",
            "/api/admin/stats",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth")));
    }
}
