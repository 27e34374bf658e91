use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::offers::handlers;
use crate::features::offers::services::OfferService;

/// Create routes for the offers feature
///
/// Note: these routes require authentication (auth middleware must be applied)
pub fn routes(service: Arc<OfferService>) -> Router {
    Router::new()
        .route(
            "/api/jobs/{id}/offers",
            get(handlers::list_job_offers).post(handlers::submit_offer),
        )
        .route("/api/offers/mine", get(handlers::list_my_offers))
        .route("/api/offers/{id}/accept", post(handlers::accept_offer))
        .with_state(service)
}
