//! Account deletion.
//!
//! Deleting an account touches the database, object storage and the
//! identity service, so it runs as a resumable saga. `account_deletions`
//! holds one row per user with the next step to run; a failed call leaves
//! the cursor where it stopped and the next call picks up from there.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | DELETE | `/api/account` | Yes | Delete the caller's own account |

pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::AccountService;
