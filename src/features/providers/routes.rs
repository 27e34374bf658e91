use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::providers::handlers;
use crate::features::providers::services::ProviderService;

/// Create routes for the providers feature
///
/// Note: these routes require authentication (auth middleware must be applied).
/// The image upload gets its own body limit sized for `max_image_bytes`.
pub fn routes(service: Arc<ProviderService>, max_image_bytes: usize) -> Router {
    // Multipart framing adds a little on top of the file itself
    let upload_limit = max_image_bytes + 64 * 1024;

    Router::new()
        .route("/api/providers", get(handlers::search_providers))
        .route(
            "/api/providers/me",
            get(handlers::get_my_profile).put(handlers::update_my_profile),
        )
        .route(
            "/api/providers/me/image",
            post(handlers::upload_profile_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/providers/{user_id}", get(handlers::get_provider))
        .with_state(service)
}
