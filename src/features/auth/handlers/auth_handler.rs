use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    ChangePasswordDto, LoginRequestDto, MeResponseDto, RefreshTokenRequestDto, SessionDto,
    SignUpHomeownerDto, SignUpProviderDto, SignUpResponseDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// Register a homeowner
#[utoipa::path(
    post,
    path = "/api/auth/signup/homeowner",
    request_body = SignUpHomeownerDto,
    responses(
        (status = 201, description = "Homeowner registered", body = ApiResponse<SignUpResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn sign_up_homeowner(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<SignUpHomeownerDto>,
) -> Result<(StatusCode, Json<ApiResponse<SignUpResponseDto>>)> {
    let response = service.sign_up_homeowner(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// Register a service provider with a profile
#[utoipa::path(
    post,
    path = "/api/auth/signup/provider",
    request_body = SignUpProviderDto,
    responses(
        (status = 201, description = "Service provider registered", body = ApiResponse<SignUpResponseDto>),
        (status = 400, description = "Validation error or unknown category"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn sign_up_provider(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<SignUpProviderDto>,
) -> Result<(StatusCode, Json<ApiResponse<SignUpResponseDto>>)> {
    let response = service.sign_up_provider(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<SessionDto>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<SessionDto>>> {
    let session = service.login(dto).await?;
    Ok(Json(ApiResponse::success(Some(session), None, None)))
}

/// Refresh access token using refresh token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshTokenRequestDto,
    responses(
        (status = 200, description = "Token refreshed successfully", body = ApiResponse<SessionDto>),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RefreshTokenRequestDto>,
) -> Result<Json<ApiResponse<SessionDto>>> {
    let session = service.refresh(dto).await?;
    Ok(Json(ApiResponse::success(Some(session), None, None)))
}

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<MeResponseDto>>> {
    Ok(Json(ApiResponse::success(Some(service.me(user)), None, None)))
}

/// Revoke the current session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<()>>> {
    service.logout(&user).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Signed out".to_string()),
        None,
    )))
}

/// Change the caller's password
#[utoipa::path(
    put,
    path = "/api/auth/password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Password too weak"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn change_password(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<ChangePasswordDto>,
) -> Result<Json<ApiResponse<()>>> {
    service.change_password(&user, dto).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Password updated".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::routes;
    use crate::features::categories::CategoryService;
    use crate::features::roles::Role;
    use crate::shared::test_helpers::{session, with_user, FakeIdentityProvider, InMemoryStore};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn service(store: &Arc<InMemoryStore>) -> Arc<AuthService> {
        Arc::new(AuthService::new(
            FakeIdentityProvider::new(),
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(CategoryService::new(store.clone())),
        ))
    }

    #[tokio::test]
    async fn test_sign_up_then_login() {
        let store = InMemoryStore::new();
        let server = TestServer::new(routes::public_routes(service(&store))).unwrap();

        let response = server
            .post("/api/auth/signup/homeowner")
            .json(&json!({
                "email": "casey@example.com",
                "password": "Secret123!",
                "full_name": "Casey Jones"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["user"]["role"], "homeowner");

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "casey@example.com", "password": "Secret123!" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["token_type"], "bearer");
        assert!(body["data"]["access_token"].is_string());

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "casey@example.com", "password": "Wrong123!" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let store = InMemoryStore::new();
        let server = TestServer::new(routes::public_routes(service(&store))).unwrap();

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "casey@example.com" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_me_returns_session_role() {
        let store = InMemoryStore::new();
        let user = session(Role::ServiceProvider);
        let server = TestServer::new(with_user(
            routes::protected_routes(service(&store)),
            user.clone(),
        ))
        .unwrap();

        let response = server.get("/api/auth/me").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["user_id"], user.user_id.to_string());
        assert_eq!(body["data"]["role"], "service_provider");
    }
}
