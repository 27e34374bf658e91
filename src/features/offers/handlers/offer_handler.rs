use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireHomeowner, RequireProvider};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::offers::dtos::{
    AcceptedOfferDto, JobOfferDto, MyOfferDto, OfferResponseDto, SubmitOfferDto,
};
use crate::features::offers::services::OfferService;
use crate::shared::types::{ApiResponse, Meta};

/// Make an offer on an open job
#[utoipa::path(
    post,
    path = "/api/jobs/{id}/offers",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = SubmitOfferDto,
    responses(
        (status = 201, description = "Offer submitted", body = ApiResponse<OfferResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Provider access required, or own job"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Already offered, or job no longer open")
    ),
    security(("bearer_auth" = [])),
    tag = "offers"
)]
pub async fn submit_offer(
    RequireProvider(user): RequireProvider,
    State(service): State<Arc<OfferService>>,
    Path(job_id): Path<Uuid>,
    AppJson(dto): AppJson<SubmitOfferDto>,
) -> Result<(StatusCode, Json<ApiResponse<OfferResponseDto>>)> {
    let offer = service.submit(&user, job_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(offer),
            Some("Offer submitted".to_string()),
            None,
        )),
    ))
}

/// Offers on a job
#[utoipa::path(
    get,
    path = "/api/jobs/{id}/offers",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Offers, newest first", body = ApiResponse<Vec<JobOfferDto>>),
        (status = 403, description = "Not the job owner"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = [])),
    tag = "offers"
)]
pub async fn list_job_offers(
    user: AuthenticatedUser,
    State(service): State<Arc<OfferService>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<JobOfferDto>>>> {
    let offers = service.list_for_job(&user, job_id).await?;
    let total = offers.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(offers),
        None,
        Some(Meta::total(total)),
    )))
}

/// Offers made by the calling provider
#[utoipa::path(
    get,
    path = "/api/offers/mine",
    responses(
        (status = 200, description = "Caller's offers", body = ApiResponse<Vec<MyOfferDto>>),
        (status = 403, description = "Service provider access required")
    ),
    security(("bearer_auth" = [])),
    tag = "offers"
)]
pub async fn list_my_offers(
    RequireProvider(user): RequireProvider,
    State(service): State<Arc<OfferService>>,
) -> Result<Json<ApiResponse<Vec<MyOfferDto>>>> {
    let offers = service.list_mine(&user).await?;
    let total = offers.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(offers),
        None,
        Some(Meta::total(total)),
    )))
}

/// Accept an offer
///
/// Assigns the job to the offer's provider and rejects every other pending
/// offer on the job.
#[utoipa::path(
    post,
    path = "/api/offers/{id}/accept",
    params(
        ("id" = Uuid, Path, description = "Offer ID")
    ),
    responses(
        (status = 200, description = "Offer accepted", body = ApiResponse<AcceptedOfferDto>),
        (status = 403, description = "Not the job owner"),
        (status = 404, description = "Offer not found"),
        (status = 409, description = "Job no longer open or offer no longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "offers"
)]
pub async fn accept_offer(
    RequireHomeowner(user): RequireHomeowner,
    State(service): State<Arc<OfferService>>,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<ApiResponse<AcceptedOfferDto>>> {
    let accepted = service.accept(&user, offer_id).await?;
    Ok(Json(ApiResponse::success(
        Some(accepted),
        Some("Offer accepted".to_string()),
        None,
    )))
}
