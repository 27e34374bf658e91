use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::features::jobs::dtos::{JobResponseDto, UpdateJobStatusDto};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List all users with their roles
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "List of users", body = ApiResponse<Vec<AdminUserDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 502, description = "Auth service unavailable")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<Vec<AdminUserDto>>>> {
    let users = service.list_users().await?;
    let total = users.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(users),
        None,
        Some(Meta::total(total)),
    )))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = ChangeRoleDto,
    responses(
        (status = 200, description = "Role changed", body = ApiResponse<AdminRoleDto>),
        (status = 403, description = "Forbidden - Admin access required, or own role"),
        (status = 404, description = "User has no role")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn change_user_role(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(user_id): Path<Uuid>,
    AppJson(dto): AppJson<ChangeRoleDto>,
) -> Result<Json<ApiResponse<AdminRoleDto>>> {
    let role = service.change_role(&admin, user_id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(role),
        Some("Role updated".to_string()),
        None,
    )))
}

/// Delete a user and all their data
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Forbidden - Admin access required, or own account"),
        (status = 404, description = "No user with this ID"),
        (status = 409, description = "Account already deleted"),
        (status = 502, description = "A deletion step failed; retry to resume")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_user(&admin, user_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("User deleted".to_string()),
        None,
    )))
}

/// List all jobs (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/jobs",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of jobs, newest first", body = ApiResponse<Vec<AdminJobDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_jobs(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AdminJobDto>>>> {
    let (items, total) = service.list_jobs(params.offset(), params.limit()).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::paged(total, &params)),
    )))
}

/// Change any job's status
#[utoipa::path(
    patch,
    path = "/api/admin/jobs/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = UpdateJobStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<JobResponseDto>),
        (status = 400, description = "Invalid status transition"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Status changed concurrently")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_job_status(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(job_id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateJobStatusDto>,
) -> Result<Json<ApiResponse<JobResponseDto>>> {
    let job = service.set_job_status(&admin, job_id, dto.status).await?;
    Ok(Json(ApiResponse::success(
        Some(job),
        Some("Job status updated".to_string()),
        None,
    )))
}

/// Delete any job that is not under way
#[utoipa::path(
    delete,
    path = "/api/admin/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job deleted"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job is assigned or in progress")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_job(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_job(&admin, job_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Job deleted".to_string()),
        None,
    )))
}

/// Create a service category
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Category already exists")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_category(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    let category = service.create_category(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created".to_string()),
            None,
        )),
    ))
}

/// Delete an unused service category
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category is in use")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_category(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_category(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted".to_string()),
        None,
    )))
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Counts of users, jobs, offers and ratings", body = ApiResponse<AdminStatsDto>),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_stats(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<AdminStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
