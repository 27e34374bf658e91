use std::sync::Arc;

use axum::{routing::delete, Router};

use crate::features::accounts::handlers;
use crate::features::accounts::services::AccountService;

/// Create routes for the account feature
///
/// Note: these routes require authentication (auth middleware must be applied)
pub fn routes(service: Arc<AccountService>) -> Router {
    Router::new()
        .route("/api/account", delete(handlers::delete_account))
        .with_state(service)
}
