use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::accounts::services::AccountService;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;

/// Delete the caller's own account
///
/// The account is taken from the bearer token. A deletion that failed part
/// way can be retried and resumes where it stopped.
#[utoipa::path(
    delete,
    path = "/api/account",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Authentication required"),
        (status = 409, description = "Account already deleted"),
        (status = 502, description = "A deletion step failed; retry to resume")
    ),
    security(("bearer_auth" = [])),
    tag = "account"
)]
pub async fn delete_account(
    user: AuthenticatedUser,
    State(service): State<Arc<AccountService>>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_account(user.user_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Account deleted successfully".to_string()),
        None,
    )))
}
