use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::clients::{IdentitySession, IdentityUser};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::roles::Role;
use crate::shared::validation::{validate_password_strength, validate_phone};

/// Request DTO for homeowner sign-up
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignUpHomeownerDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: Option<String>,
}

/// Request DTO for service provider sign-up
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignUpProviderDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: String,

    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "(555) 010-0199")]
    pub phone: String,

    #[validate(length(min = 2, max = 100, message = "City must be 2-100 characters"))]
    pub city: String,

    /// Trade the provider works in
    pub skill_category_id: Uuid,
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request DTO for token refresh
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequestDto {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

/// User info included in session responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: Uuid,
    pub email: Option<String>,
    /// `None` if the account has no marketplace role yet
    pub role: Option<Role>,
}

/// Token pair plus the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "bearer")
    pub token_type: String,
    /// Token expiry time in seconds
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: AuthUserDto,
}

impl SessionDto {
    pub fn new(session: IdentitySession, role: Option<Role>) -> Self {
        Self {
            access_token: session.access_token,
            token_type: session.token_type,
            expires_in: session.expires_in,
            refresh_token: session.refresh_token,
            user: AuthUserDto::new(session.user, role),
        }
    }
}

impl AuthUserDto {
    pub fn new(user: IdentityUser, role: Option<Role>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role,
        }
    }
}

/// Response DTO for sign-up
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignUpResponseDto {
    pub user: AuthUserDto,
    /// Present when the account can sign in straight away
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionDto>,
    /// The email address must be confirmed before the first sign-in
    pub email_confirmation_required: bool,
}

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            role: user.role,
        }
    }
}
