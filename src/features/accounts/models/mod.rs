mod account_deletion;

pub use account_deletion::{AccountDeletion, DeletionStatus, DeletionStep, PurgedRows};
