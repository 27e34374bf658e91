//! User roles.
//!
//! Every user has exactly one row in `user_roles`. The row is written at
//! sign-up, changed only by admins and removed by account deletion. The
//! auth middleware reads it on every request to build the caller's session.

pub mod models;
pub mod repositories;

pub use models::Role;
pub use repositories::{PgUserRoleRepository, UserRoleRepository};
