use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::ratings::handlers;
use crate::features::ratings::services::RatingService;

/// Create routes for the ratings feature
///
/// Note: these routes require authentication (auth middleware must be applied)
pub fn routes(service: Arc<RatingService>) -> Router {
    Router::new()
        .route("/api/ratings", post(handlers::submit_rating))
        .route(
            "/api/ratings/providers/{provider_id}",
            get(handlers::get_provider_ratings),
        )
        .with_state(service)
}
