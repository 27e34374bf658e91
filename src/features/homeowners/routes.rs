use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::homeowners::handlers;
use crate::features::homeowners::services::HomeownerService;

/// Create routes for the homeowner settings screen
///
/// Note: these routes require authentication (auth middleware must be applied).
pub fn routes(service: Arc<HomeownerService>, max_image_bytes: usize) -> Router {
    let upload_limit = max_image_bytes + 64 * 1024;

    Router::new()
        .route(
            "/api/homeowners/me",
            get(handlers::get_my_settings).put(handlers::update_my_settings),
        )
        .route(
            "/api/homeowners/me/image",
            post(handlers::upload_my_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(service)
}
