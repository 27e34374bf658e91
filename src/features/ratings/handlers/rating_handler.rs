use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireHomeowner;
use crate::features::ratings::dtos::{ProviderRatingsDto, RatingResponseDto, SubmitRatingDto};
use crate::features::ratings::services::RatingService;
use crate::shared::types::ApiResponse;

/// Rate the provider of a completed job
#[utoipa::path(
    post,
    path = "/api/ratings",
    request_body = SubmitRatingDto,
    responses(
        (status = 201, description = "Rating recorded", body = ApiResponse<RatingResponseDto>),
        (status = 400, description = "Invalid rating or job not completed"),
        (status = 403, description = "Not the job owner"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job has already been rated")
    ),
    security(("bearer_auth" = [])),
    tag = "ratings"
)]
pub async fn submit_rating(
    RequireHomeowner(user): RequireHomeowner,
    State(service): State<Arc<RatingService>>,
    AppJson(dto): AppJson<SubmitRatingDto>,
) -> Result<(StatusCode, Json<ApiResponse<RatingResponseDto>>)> {
    let rating = service.submit(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(rating),
            Some("Rating submitted".to_string()),
            None,
        )),
    ))
}

/// Rating summary and reviews of a provider
#[utoipa::path(
    get,
    path = "/api/ratings/providers/{provider_id}",
    params(
        ("provider_id" = Uuid, Path, description = "Provider user ID")
    ),
    responses(
        (status = 200, description = "Ratings of the provider", body = ApiResponse<ProviderRatingsDto>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "ratings"
)]
pub async fn get_provider_ratings(
    State(service): State<Arc<RatingService>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProviderRatingsDto>>> {
    let ratings = service.for_provider(provider_id).await?;
    Ok(Json(ApiResponse::success(Some(ratings), None, None)))
}
