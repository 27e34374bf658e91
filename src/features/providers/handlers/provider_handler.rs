use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppMultipart};
use crate::features::auth::guards::RequireProvider;
use crate::features::providers::dtos::{
    ProviderDetailDto, ProviderProfileDto, ProviderSearchQuery, ProviderSummaryDto,
    UpdateProviderProfileDto, UploadProfileImageDto,
};
use crate::features::providers::services::ProviderService;
use crate::modules::storage::ProfileImageUpload;
use crate::shared::types::{ApiResponse, Meta};

/// Search providers by skill category, city and free-text keyword
#[utoipa::path(
    get,
    path = "/api/providers",
    params(ProviderSearchQuery),
    responses(
        (status = 200, description = "Matching providers", body = ApiResponse<Vec<ProviderSummaryDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "providers"
)]
pub async fn search_providers(
    State(service): State<Arc<ProviderService>>,
    Query(query): Query<ProviderSearchQuery>,
) -> Result<Json<ApiResponse<Vec<ProviderSummaryDto>>>> {
    let providers = service.search(query).await?;
    let total = providers.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(providers),
        None,
        Some(Meta::total(total)),
    )))
}

/// Get a provider's public profile with ratings
#[utoipa::path(
    get,
    path = "/api/providers/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Provider user ID")
    ),
    responses(
        (status = 200, description = "Provider found", body = ApiResponse<ProviderDetailDto>),
        (status = 404, description = "Provider not found")
    ),
    security(("bearer_auth" = [])),
    tag = "providers"
)]
pub async fn get_provider(
    State(service): State<Arc<ProviderService>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProviderDetailDto>>> {
    let provider = service.get_provider(user_id).await?;
    Ok(Json(ApiResponse::success(Some(provider), None, None)))
}

/// Get the caller's provider profile
#[utoipa::path(
    get,
    path = "/api/providers/me",
    responses(
        (status = 200, description = "Own profile", body = ApiResponse<ProviderProfileDto>),
        (status = 403, description = "Service provider access required"),
        (status = 404, description = "Provider profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "providers"
)]
pub async fn get_my_profile(
    RequireProvider(user): RequireProvider,
    State(service): State<Arc<ProviderService>>,
) -> Result<Json<ApiResponse<ProviderProfileDto>>> {
    let profile = service.get_my_profile(&user).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// Update the caller's provider profile
#[utoipa::path(
    put,
    path = "/api/providers/me",
    request_body = UpdateProviderProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<ProviderProfileDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Service provider access required")
    ),
    security(("bearer_auth" = [])),
    tag = "providers"
)]
pub async fn update_my_profile(
    RequireProvider(user): RequireProvider,
    State(service): State<Arc<ProviderService>>,
    AppJson(dto): AppJson<UpdateProviderProfileDto>,
) -> Result<Json<ApiResponse<ProviderProfileDto>>> {
    let profile = service.update_my_profile(&user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Profile updated".to_string()),
        None,
    )))
}

/// Upload a new profile picture
///
/// Accepts multipart/form-data with a single `file` field holding an image.
#[utoipa::path(
    post,
    path = "/api/providers/me/image",
    request_body(
        content = UploadProfileImageDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Profile picture replaced", body = ApiResponse<ProviderProfileDto>),
        (status = 400, description = "Missing file, not an image, or too large"),
        (status = 403, description = "Service provider access required"),
        (status = 502, description = "Storage unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "providers"
)]
pub async fn upload_profile_image(
    RequireProvider(user): RequireProvider,
    State(service): State<Arc<ProviderService>>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<Json<ApiResponse<ProviderProfileDto>>> {
    let upload = ProfileImageUpload::from_multipart(&mut multipart).await?;
    let profile = service.upload_profile_image(&user, upload).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Profile picture updated".to_string()),
        None,
    )))
}
