mod account_deletion_repository;

pub use account_deletion_repository::{AccountDeletionRepository, PgAccountDeletionRepository};
