use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppMultipart};
use crate::features::auth::guards::RequireHomeowner;
use crate::features::homeowners::dtos::{HomeownerProfileDto, UpdateHomeownerProfileDto};
use crate::features::homeowners::services::HomeownerService;
use crate::features::providers::dtos::UploadProfileImageDto;
use crate::modules::storage::ProfileImageUpload;
use crate::shared::types::ApiResponse;

/// Get the caller's homeowner settings
#[utoipa::path(
    get,
    path = "/api/homeowners/me",
    responses(
        (status = 200, description = "Own settings", body = ApiResponse<HomeownerProfileDto>),
        (status = 403, description = "Homeowner access required")
    ),
    security(("bearer_auth" = [])),
    tag = "homeowners"
)]
pub async fn get_my_settings(
    RequireHomeowner(user): RequireHomeowner,
    State(service): State<Arc<HomeownerService>>,
) -> Result<Json<ApiResponse<HomeownerProfileDto>>> {
    let profile = service.get_my_profile(&user).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// Update the caller's name, phone and city
#[utoipa::path(
    put,
    path = "/api/homeowners/me",
    request_body = UpdateHomeownerProfileDto,
    responses(
        (status = 200, description = "Settings saved", body = ApiResponse<HomeownerProfileDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Homeowner access required")
    ),
    security(("bearer_auth" = [])),
    tag = "homeowners"
)]
pub async fn update_my_settings(
    RequireHomeowner(user): RequireHomeowner,
    State(service): State<Arc<HomeownerService>>,
    AppJson(dto): AppJson<UpdateHomeownerProfileDto>,
) -> Result<Json<ApiResponse<HomeownerProfileDto>>> {
    let profile = service.update_my_profile(&user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Profile updated".to_string()),
        None,
    )))
}

/// Upload a new homeowner profile picture
///
/// Accepts multipart/form-data with a single `file` field holding an image.
#[utoipa::path(
    post,
    path = "/api/homeowners/me/image",
    request_body(
        content = UploadProfileImageDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Profile picture replaced", body = ApiResponse<HomeownerProfileDto>),
        (status = 400, description = "Missing file, not an image, or too large"),
        (status = 403, description = "Homeowner access required"),
        (status = 502, description = "Storage unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "homeowners"
)]
pub async fn upload_my_image(
    RequireHomeowner(user): RequireHomeowner,
    State(service): State<Arc<HomeownerService>>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<Json<ApiResponse<HomeownerProfileDto>>> {
    let upload = ProfileImageUpload::from_multipart(&mut multipart).await?;
    let profile = service.upload_profile_image(&user, upload).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Profile picture updated".to_string()),
        None,
    )))
}
