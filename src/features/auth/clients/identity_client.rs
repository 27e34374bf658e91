use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};

/// User record as returned by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// Token pair issued on sign-in, sign-up (when confirmation is off) and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySession {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: IdentityUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Account is active and a session was issued
    Session(IdentitySession),
    /// Account created but the email address must be confirmed before sign-in
    PendingConfirmation(IdentityUser),
}

impl SignUpOutcome {
    pub fn user(&self) -> &IdentityUser {
        match self {
            SignUpOutcome::Session(session) => &session.user,
            SignUpOutcome::PendingConfirmation(user) => user,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityDeletion {
    Deleted,
    /// The identity did not exist (already deleted)
    NotFound,
}

/// Hosted identity service: accounts, sessions and admin user management
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<SignUpOutcome>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<IdentitySession>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<IdentitySession>;

    /// Revoke the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> Result<()>;

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<()>;

    async fn admin_list_users(&self) -> Result<Vec<IdentityUser>>;

    /// `None` when no identity has this id
    async fn admin_get_user(&self, user_id: Uuid) -> Result<Option<IdentityUser>>;

    async fn admin_delete_user(&self, user_id: Uuid) -> Result<IdentityDeletion>;
}

/// Error body shapes used by the auth service
#[derive(Debug, Default, Deserialize)]
struct AuthErrorResponse {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AuthErrorResponse {
    fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct AdminUsersPage {
    users: Vec<IdentityUser>,
}

/// REST client for a GoTrue-compatible auth service
pub struct GoTrueClient {
    base_url: String,
    anon_key: String,
    service_role_key: String,
    http_client: reqwest::Client,
}

impl GoTrueClient {
    const ADMIN_PAGE_SIZE: usize = 1000;

    pub fn new(config: &AuthConfig) -> Self {
        Self {
            base_url: format!("{}/auth/v1", config.url),
            anon_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn public(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
    }

    fn admin(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, self.url(path))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    async fn send(&self, request: reqwest::RequestBuilder, action: &str) -> Result<Response> {
        request.send().await.map_err(|e| {
            tracing::error!("Auth service request failed ({}): {}", action, e);
            AppError::ExternalServiceError(format!("Failed to {}: {}", action, e))
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response, action: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse auth service response ({}): {}", action, e);
            AppError::ExternalServiceError(format!("Failed to parse {} response: {}", action, e))
        })
    }

    /// Map a non-success response onto the error taxonomy
    async fn error(response: Response, action: &str) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: AuthErrorResponse = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed.message();

        match (status, parsed.error_code.as_deref()) {
            (_, Some("user_already_exists")) | (_, Some("email_exists")) => {
                AppError::Conflict("Email already registered".to_string())
            }
            (_, Some("weak_password")) => AppError::Validation(message),
            (_, Some("invalid_credentials")) => {
                AppError::Unauthorized("Invalid login credentials".to_string())
            }
            (StatusCode::UNPROCESSABLE_ENTITY, _) if message.contains("already registered") => {
                AppError::Conflict("Email already registered".to_string())
            }
            (StatusCode::BAD_REQUEST, _) | (StatusCode::UNAUTHORIZED, _) => {
                AppError::Unauthorized(message)
            }
            (StatusCode::UNPROCESSABLE_ENTITY, _) => AppError::Validation(message),
            _ => {
                tracing::error!("Auth service error ({}): HTTP {} - {}", action, status, body);
                AppError::ExternalServiceError(format!("Auth service error: HTTP {}", status))
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<SignUpOutcome> {
        let request = self
            .public(reqwest::Method::POST, "/signup")
            .json(&json!({ "email": email, "password": password, "data": metadata }));
        let response = self.send(request, "sign up").await?;
        if !response.status().is_success() {
            return Err(Self::error(response, "sign up").await);
        }

        let body: serde_json::Value = Self::parse(response, "sign up").await?;
        let outcome = if body.get("access_token").is_some() {
            SignUpOutcome::Session(serde_json::from_value(body).map_err(|e| {
                AppError::ExternalServiceError(format!("Invalid sign up session: {}", e))
            })?)
        } else {
            SignUpOutcome::PendingConfirmation(serde_json::from_value(body).map_err(|e| {
                AppError::ExternalServiceError(format!("Invalid sign up user: {}", e))
            })?)
        };

        tracing::info!("Identity created: {}", outcome.user().id);
        Ok(outcome)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<IdentitySession> {
        let request = self
            .public(reqwest::Method::POST, "/token?grant_type=password")
            .json(&json!({ "email": email, "password": password }));
        let response = self.send(request, "sign in").await?;
        if !response.status().is_success() {
            return Err(Self::error(response, "sign in").await);
        }
        Self::parse(response, "sign in").await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<IdentitySession> {
        let request = self
            .public(reqwest::Method::POST, "/token?grant_type=refresh_token")
            .json(&json!({ "refresh_token": refresh_token }));
        let response = self.send(request, "refresh session").await?;
        if !response.status().is_success() {
            return Err(Self::error(response, "refresh session").await);
        }
        Self::parse(response, "refresh session").await
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let request = self
            .public(reqwest::Method::POST, "/logout")
            .bearer_auth(access_token);
        let response = self.send(request, "sign out").await?;
        // An already-revoked session is as good as a sign-out
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(Self::error(response, "sign out").await)
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<()> {
        let request = self
            .public(reqwest::Method::PUT, "/user")
            .bearer_auth(access_token)
            .json(&json!({ "password": new_password }));
        let response = self.send(request, "update password").await?;
        if !response.status().is_success() {
            return Err(Self::error(response, "update password").await);
        }
        Ok(())
    }

    async fn admin_list_users(&self) -> Result<Vec<IdentityUser>> {
        let mut users = Vec::new();
        let mut page = 1;

        loop {
            let path = format!("/admin/users?page={}&per_page={}", page, Self::ADMIN_PAGE_SIZE);
            let response = self
                .send(self.admin(reqwest::Method::GET, &path), "list users")
                .await?;
            if !response.status().is_success() {
                return Err(Self::error(response, "list users").await);
            }

            let batch: AdminUsersPage = Self::parse(response, "list users").await?;
            let fetched = batch.users.len();
            users.extend(batch.users);

            if fetched < Self::ADMIN_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(users)
    }

    async fn admin_get_user(&self, user_id: Uuid) -> Result<Option<IdentityUser>> {
        let path = format!("/admin/users/{}", user_id);
        let response = self
            .send(self.admin(reqwest::Method::GET, &path), "get user")
            .await?;

        match response.status() {
            status if status.is_success() => Self::parse(response, "get user").await.map(Some),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::error(response, "get user").await),
        }
    }

    async fn admin_delete_user(&self, user_id: Uuid) -> Result<IdentityDeletion> {
        let path = format!("/admin/users/{}", user_id);
        let response = self
            .send(self.admin(reqwest::Method::DELETE, &path), "delete user")
            .await?;

        match response.status() {
            status if status.is_success() => {
                tracing::info!("Identity deleted: {}", user_id);
                Ok(IdentityDeletion::Deleted)
            }
            StatusCode::NOT_FOUND => {
                tracing::warn!("Identity {} was already deleted", user_id);
                Ok(IdentityDeletion::NotFound)
            }
            _ => Err(Self::error(response, "delete user").await),
        }
    }
}
