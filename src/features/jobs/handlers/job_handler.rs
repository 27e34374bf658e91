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
use crate::features::jobs::dtos::{JobFieldsDto, JobResponseDto, UpdateJobStatusDto};
use crate::features::jobs::services::JobService;
use crate::shared::types::{ApiResponse, Meta};

fn listed(jobs: Vec<JobResponseDto>) -> Json<ApiResponse<Vec<JobResponseDto>>> {
    let total = jobs.len() as i64;
    Json(ApiResponse::success(Some(jobs), None, Some(Meta::total(total))))
}

/// Post a new job
#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = JobFieldsDto,
    responses(
        (status = 201, description = "Job posted", body = ApiResponse<JobResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Homeowner access required"),
        (status = 429, description = "Too many open jobs posted recently")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
pub async fn create_job(
    RequireHomeowner(user): RequireHomeowner,
    State(service): State<Arc<JobService>>,
    AppJson(dto): AppJson<JobFieldsDto>,
) -> Result<(StatusCode, Json<ApiResponse<JobResponseDto>>)> {
    let job = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(job),
            Some("Job posted".to_string()),
            None,
        )),
    ))
}

/// List jobs posted by the caller
#[utoipa::path(
    get,
    path = "/api/jobs/mine",
    responses(
        (status = 200, description = "Caller's jobs, newest first", body = ApiResponse<Vec<JobResponseDto>>),
        (status = 403, description = "Homeowner access required")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
pub async fn list_my_jobs(
    RequireHomeowner(user): RequireHomeowner,
    State(service): State<Arc<JobService>>,
) -> Result<Json<ApiResponse<Vec<JobResponseDto>>>> {
    Ok(listed(service.list_mine(&user).await?))
}

/// Open jobs in the provider's skill category
#[utoipa::path(
    get,
    path = "/api/jobs/open",
    responses(
        (status = 200, description = "Open jobs, newest first", body = ApiResponse<Vec<JobResponseDto>>),
        (status = 403, description = "Service provider access required"),
        (status = 404, description = "Provider profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
pub async fn list_open_jobs(
    RequireProvider(user): RequireProvider,
    State(service): State<Arc<JobService>>,
) -> Result<Json<ApiResponse<Vec<JobResponseDto>>>> {
    Ok(listed(service.list_open(&user).await?))
}

/// Jobs assigned to the calling provider
#[utoipa::path(
    get,
    path = "/api/jobs/assigned",
    responses(
        (status = 200, description = "Assigned and in-progress jobs", body = ApiResponse<Vec<JobResponseDto>>),
        (status = 403, description = "Service provider access required")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
pub async fn list_assigned_jobs(
    RequireProvider(user): RequireProvider,
    State(service): State<Arc<JobService>>,
) -> Result<Json<ApiResponse<Vec<JobResponseDto>>>> {
    Ok(listed(service.list_assigned(&user).await?))
}

/// Get job by id
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = ApiResponse<JobResponseDto>),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
pub async fn get_job(
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<JobResponseDto>>> {
    let job = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(job), None, None)))
}

/// Edit an open job
#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = JobFieldsDto,
    responses(
        (status = 200, description = "Job updated", body = ApiResponse<JobResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the job owner"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job is no longer open")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
pub async fn update_job(
    RequireHomeowner(user): RequireHomeowner,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<JobFieldsDto>,
) -> Result<Json<ApiResponse<JobResponseDto>>> {
    let job = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(job),
        Some("Job updated".to_string()),
        None,
    )))
}

/// Delete a job
#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job deleted"),
        (status = 403, description = "Not the job owner"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job is assigned or in progress")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
pub async fn delete_job(
    user: AuthenticatedUser,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Job deleted".to_string()),
        None,
    )))
}

/// Change a job's status
///
/// The owner may cancel an open job or complete an assigned one; the
/// assigned provider may start and complete work.
#[utoipa::path(
    patch,
    path = "/api/jobs/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = UpdateJobStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<JobResponseDto>),
        (status = 400, description = "Invalid status transition"),
        (status = 403, description = "Caller may not make this change"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Status changed concurrently")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
pub async fn update_job_status(
    user: AuthenticatedUser,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateJobStatusDto>,
) -> Result<Json<ApiResponse<JobResponseDto>>> {
    let job = service.set_status(&user, id, dto.status).await?;
    Ok(Json(ApiResponse::success(
        Some(job),
        Some("Job status updated".to_string()),
        None,
    )))
}
