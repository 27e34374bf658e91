//! Role-based authorization guards.
//!
//! Each guard extracts the session attached by the auth middleware and
//! checks the caller's single marketplace role. Roles do not nest: an admin
//! moderates through `/api/admin` and does not post jobs or submit offers.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::roles::Role;
use axum::{extract::FromRequestParts, http::request::Parts};

fn session(parts: &Parts) -> Result<AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

fn require(parts: &Parts, role: Role, message: &str) -> Result<AuthenticatedUser, AppError> {
    let user = session(parts)?;
    if user.has_role(role) {
        Ok(user)
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}

/// Guard for admin-only routes.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(parts, Role::Admin, "Admin access required").map(RequireAdmin)
    }
}

/// Guard for homeowner routes (posting jobs, accepting offers, rating).
pub struct RequireHomeowner(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireHomeowner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(parts, Role::Homeowner, "Homeowner access required").map(RequireHomeowner)
    }
}

/// Guard for service-provider routes (job feed, offers, profile).
pub struct RequireProvider(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireProvider
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(parts, Role::ServiceProvider, "Service provider access required")
            .map(RequireProvider)
    }
}
