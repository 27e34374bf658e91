use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::accounts::models::{AccountDeletion, DeletionStep};
use crate::features::accounts::repositories::AccountDeletionRepository;
use crate::features::auth::clients::{IdentityDeletion, IdentityProvider};
use crate::features::roles::{Role, UserRoleRepository};
use crate::modules::storage::ProfileImages;

/// Runs the account deletion saga
pub struct AccountService {
    deletions: Arc<dyn AccountDeletionRepository>,
    roles: Arc<dyn UserRoleRepository>,
    images: Arc<ProfileImages>,
    identity: Arc<dyn IdentityProvider>,
}

impl AccountService {
    pub fn new(
        deletions: Arc<dyn AccountDeletionRepository>,
        roles: Arc<dyn UserRoleRepository>,
        images: Arc<ProfileImages>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            deletions,
            roles,
            images,
            identity,
        }
    }

    /// Delete every trace of `user_id`, resuming an interrupted deletion.
    ///
    /// A step failure is recorded on the saga row and surfaces as
    /// `ExternalServiceError`; steps that already ran are not undone.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<()> {
        let existing = self.deletions.find(user_id).await?;
        if existing.as_ref().is_some_and(AccountDeletion::is_completed) {
            return Err(AppError::Conflict("Account already deleted".to_string()));
        }

        let mut deletion = match existing {
            Some(deletion) => {
                tracing::info!(
                    "Resuming deletion of {} at {} (attempt {}, last error: {:?})",
                    user_id,
                    deletion.step,
                    deletion.attempts + 1,
                    deletion.last_error
                );
                deletion
            }
            None => {
                let role = self.roles.find_role(user_id).await?;
                if role.is_none() && self.identity.admin_get_user(user_id).await?.is_none() {
                    return Err(AppError::NotFound(format!("User '{}' not found", user_id)));
                }
                tracing::info!("Starting deletion of {} ({:?})", user_id, role);
                self.deletions.begin(user_id, role).await?
            }
        };

        while deletion.step != DeletionStep::Done {
            let step = deletion.step;
            if let Err(e) = self.run_step(&deletion).await {
                tracing::error!("Deletion of {} failed at {}: {}", user_id, step, e);
                self.deletions.record_failure(user_id, &e.to_string()).await?;
                return Err(AppError::ExternalServiceError(format!(
                    "Account deletion failed at step '{}'. Please try again",
                    step
                )));
            }
            deletion = self
                .deletions
                .advance(user_id, step, step.next())
                .await?
                .ok_or_else(|| {
                    tracing::warn!("Deletion of {} moved past {} concurrently", user_id, step);
                    AppError::Conflict("Account deletion is already in progress".to_string())
                })?;
        }

        self.deletions.complete(user_id).await?;
        tracing::info!("Account {} deleted", user_id);
        Ok(())
    }

    async fn run_step(&self, deletion: &AccountDeletion) -> Result<()> {
        let user_id = deletion.user_id;
        match deletion.step {
            DeletionStep::RemoveProfileImages => {
                // Pictures are best-effort: an orphaned object never blocks deletion
                if let Err(e) = self.images.remove_all(user_id).await {
                    tracing::warn!("Could not remove profile images of {}: {}", user_id, e);
                }
            }
            DeletionStep::RemoveRoleData => {
                let purged = match deletion.role {
                    Some(Role::ServiceProvider) => {
                        self.deletions.purge_provider_data(user_id).await?
                    }
                    Some(Role::Homeowner) => self.deletions.purge_homeowner_data(user_id).await?,
                    Some(Role::Admin) | None => Default::default(),
                };
                tracing::debug!("Purged data of {}: {:?}", user_id, purged);
            }
            DeletionStep::RemoveRole => {
                self.roles.delete(user_id).await?;
            }
            DeletionStep::DeleteIdentity => {
                if self.identity.admin_delete_user(user_id).await? == IdentityDeletion::NotFound {
                    tracing::debug!("Identity {} was already gone", user_id);
                }
            }
            DeletionStep::Done => {}
        }
        Ok(())
    }
}
