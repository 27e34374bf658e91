use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::roles::Role;

/// Account deletion cursor (PostgreSQL enum `deletion_step`), in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deletion_step", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeletionStep {
    RemoveProfileImages,
    RemoveRoleData,
    RemoveRole,
    DeleteIdentity,
    Done,
}

impl DeletionStep {
    pub fn next(self) -> DeletionStep {
        match self {
            DeletionStep::RemoveProfileImages => DeletionStep::RemoveRoleData,
            DeletionStep::RemoveRoleData => DeletionStep::RemoveRole,
            DeletionStep::RemoveRole => DeletionStep::DeleteIdentity,
            DeletionStep::DeleteIdentity | DeletionStep::Done => DeletionStep::Done,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionStep::RemoveProfileImages => "remove_profile_images",
            DeletionStep::RemoveRoleData => "remove_role_data",
            DeletionStep::RemoveRole => "remove_role",
            DeletionStep::DeleteIdentity => "delete_identity",
            DeletionStep::Done => "done",
        }
    }
}

impl std::fmt::Display for DeletionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deletion_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeletionStatus {
    InProgress,
    Completed,
}

/// Database model for `account_deletions`, the durable step log of one deletion
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AccountDeletion {
    pub user_id: Uuid,
    /// Role captured when the deletion started; drives which rows are removed
    pub role: Option<Role>,
    pub step: DeletionStep,
    pub status: DeletionStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
}

impl AccountDeletion {
    pub fn is_completed(&self) -> bool {
        self.status == DeletionStatus::Completed
    }
}

/// Rows removed by the role-data step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgedRows {
    pub profiles: u64,
    pub jobs: u64,
    pub offers: u64,
    pub ratings: u64,
}
