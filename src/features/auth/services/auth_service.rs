use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::clients::{IdentityProvider, SignUpOutcome};
use crate::features::auth::dtos::{
    AuthUserDto, ChangePasswordDto, LoginRequestDto, MeResponseDto, RefreshTokenRequestDto,
    SessionDto, SignUpHomeownerDto, SignUpProviderDto, SignUpResponseDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::CategoryService;
use crate::features::homeowners::models::HomeownerProfileChanges;
use crate::features::homeowners::repositories::HomeownerProfileRepository;
use crate::features::providers::models::NewProviderProfile;
use crate::features::providers::repositories::ProviderProfileRepository;
use crate::features::roles::{Role, UserRoleRepository};
use crate::shared::validation::{blank_to_none, collapse_whitespace};

fn normalise_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Service for sign-up, sessions and password changes.
///
/// Credentials live in the identity service; this service adds the
/// marketplace role and the matching profile on top.
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    roles: Arc<dyn UserRoleRepository>,
    providers: Arc<dyn ProviderProfileRepository>,
    homeowners: Arc<dyn HomeownerProfileRepository>,
    categories: Arc<CategoryService>,
}

impl AuthService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        roles: Arc<dyn UserRoleRepository>,
        providers: Arc<dyn ProviderProfileRepository>,
        homeowners: Arc<dyn HomeownerProfileRepository>,
        categories: Arc<CategoryService>,
    ) -> Self {
        Self {
            identity,
            roles,
            providers,
            homeowners,
            categories,
        }
    }

    pub async fn sign_up_homeowner(&self, dto: SignUpHomeownerDto) -> Result<SignUpResponseDto> {
        let dto = SignUpHomeownerDto {
            email: normalise_email(&dto.email),
            full_name: blank_to_none(dto.full_name.as_deref().map(collapse_whitespace)),
            ..dto
        };
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let outcome = self
            .identity
            .sign_up(
                &dto.email,
                &dto.password,
                json!({ "full_name": dto.full_name, "role": Role::Homeowner }),
            )
            .await?;
        let user_id = outcome.user().id;
        self.ensure_new_account(user_id).await?;

        if let Err(e) = self.roles.insert(user_id, Role::Homeowner).await {
            return Err(self.abandon_sign_up(user_id, e).await);
        }

        let profile = HomeownerProfileChanges {
            full_name: dto.full_name,
            ..Default::default()
        };
        if let Err(e) = self.homeowners.upsert(user_id, profile).await {
            self.roll_back_sign_up(user_id).await;
            return Err(e);
        }

        tracing::info!("Homeowner {} signed up", user_id);
        Ok(Self::sign_up_response(outcome, Role::Homeowner))
    }

    pub async fn sign_up_provider(&self, dto: SignUpProviderDto) -> Result<SignUpResponseDto> {
        let dto = SignUpProviderDto {
            email: normalise_email(&dto.email),
            full_name: collapse_whitespace(&dto.full_name),
            phone: dto.phone.trim().to_string(),
            city: collapse_whitespace(&dto.city),
            ..dto
        };
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.categories.require(dto.skill_category_id).await?;

        let outcome = self
            .identity
            .sign_up(
                &dto.email,
                &dto.password,
                json!({ "full_name": dto.full_name, "role": Role::ServiceProvider }),
            )
            .await?;
        let user_id = outcome.user().id;
        self.ensure_new_account(user_id).await?;

        if let Err(e) = self.roles.insert(user_id, Role::ServiceProvider).await {
            return Err(self.abandon_sign_up(user_id, e).await);
        }

        let profile = NewProviderProfile {
            user_id,
            full_name: dto.full_name,
            phone: dto.phone,
            city: dto.city,
            skill_category_id: dto.skill_category_id,
        };
        if let Err(e) = self.providers.insert(profile).await {
            self.roll_back_sign_up(user_id).await;
            return Err(e);
        }

        tracing::info!("Service provider {} signed up", user_id);
        Ok(Self::sign_up_response(outcome, Role::ServiceProvider))
    }

    /// An auth service with email confirmation on answers a repeated sign-up
    /// with the existing, unconfirmed user instead of an error. A role on
    /// that user means the account is already registered here.
    async fn ensure_new_account(&self, user_id: Uuid) -> Result<()> {
        if self.roles.find_role(user_id).await?.is_some() {
            tracing::info!("Sign-up for already registered user {}", user_id);
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        Ok(())
    }

    /// Undo a sign-up whose role could not be written. A role conflict means
    /// a concurrent sign-up of the same identity won; its records are kept.
    async fn abandon_sign_up(&self, user_id: Uuid, error: AppError) -> AppError {
        if matches!(error, AppError::Conflict(_)) {
            return AppError::Conflict("Email already registered".to_string());
        }
        self.discard_identity(user_id).await;
        error
    }

    /// Remove the role written by this sign-up and its identity, so the
    /// email address can be used again
    async fn roll_back_sign_up(&self, user_id: Uuid) {
        if let Err(e) = self.roles.delete(user_id).await {
            tracing::warn!("Could not remove role of {}: {}", user_id, e);
        }
        self.discard_identity(user_id).await;
    }

    /// Remove an identity whose marketplace records could not be written
    async fn discard_identity(&self, user_id: Uuid) {
        if let Err(e) = self.identity.admin_delete_user(user_id).await {
            tracing::warn!("Could not discard identity {} after failed sign-up: {}", user_id, e);
        }
    }

    fn sign_up_response(outcome: SignUpOutcome, role: Role) -> SignUpResponseDto {
        match outcome {
            SignUpOutcome::Session(session) => SignUpResponseDto {
                user: AuthUserDto::new(session.user.clone(), Some(role)),
                session: Some(SessionDto::new(session, Some(role))),
                email_confirmation_required: false,
            },
            SignUpOutcome::PendingConfirmation(user) => SignUpResponseDto {
                user: AuthUserDto::new(user, Some(role)),
                session: None,
                email_confirmation_required: true,
            },
        }
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<SessionDto> {
        let session = self
            .identity
            .sign_in_with_password(&normalise_email(&dto.email), &dto.password)
            .await?;
        let role = self.roles.find_role(session.user.id).await?;
        Ok(SessionDto::new(session, role))
    }

    /// Exchange a refresh token for a new session
    pub async fn refresh(&self, dto: RefreshTokenRequestDto) -> Result<SessionDto> {
        let session = self.identity.refresh_session(&dto.refresh_token).await?;
        let role = self.roles.find_role(session.user.id).await?;
        Ok(SessionDto::new(session, role))
    }

    pub async fn logout(&self, user: &AuthenticatedUser) -> Result<()> {
        self.identity.sign_out(&user.access_token).await
    }

    pub fn me(&self, user: AuthenticatedUser) -> MeResponseDto {
        user.into()
    }

    pub async fn change_password(
        &self,
        user: &AuthenticatedUser,
        dto: ChangePasswordDto,
    ) -> Result<()> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.identity
            .update_password(&user.access_token, &dto.new_password)
            .await?;
        tracing::info!("Password changed for {}", user.user_id);
        Ok(())
    }
}
