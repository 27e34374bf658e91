use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::jobs::handlers;
use crate::features::jobs::services::JobService;

/// Create routes for the jobs feature
///
/// Note: these routes require authentication (auth middleware must be applied)
pub fn routes(service: Arc<JobService>) -> Router {
    Router::new()
        .route("/api/jobs", post(handlers::create_job))
        .route("/api/jobs/mine", get(handlers::list_my_jobs))
        .route("/api/jobs/open", get(handlers::list_open_jobs))
        .route("/api/jobs/assigned", get(handlers::list_assigned_jobs))
        .route(
            "/api/jobs/{id}",
            get(handlers::get_job)
                .put(handlers::update_job)
                .delete(handlers::delete_job),
        )
        .route("/api/jobs/{id}/status", patch(handlers::update_job_status))
        .with_state(service)
}
