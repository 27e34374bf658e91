use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Marketplace role (PostgreSQL enum `app_role`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "app_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Posts jobs and accepts offers
    Homeowner,
    /// Browses open jobs and submits offers
    ServiceProvider,
    /// Moderates users, jobs and categories
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Homeowner => "homeowner",
            Role::ServiceProvider => "service_provider",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for `user_roles`
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleRecord {
    pub user_id: Uuid,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::ServiceProvider.to_string(), "service_provider");
        let parsed: Role = serde_json::from_str("\"homeowner\"").unwrap();
        assert_eq!(parsed, Role::Homeowner);
    }
}
