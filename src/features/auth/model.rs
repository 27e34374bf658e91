use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::roles::Role;

/// Per-request session built by the auth middleware.
///
/// The identity comes from the verified bearer token; the role is read from
/// `user_roles` so it always reflects the latest admin change.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// `None` until a role row exists (e.g. sign-up interrupted before the role insert)
    pub role: Option<Role>,
    /// Raw bearer token, forwarded to the auth service for user-scoped calls
    #[serde(skip)]
    pub access_token: String,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Identity claims extracted from a verified access token
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: Option<String>,
}
