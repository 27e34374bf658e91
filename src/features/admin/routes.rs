use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (all require the admin role)
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/{id}", delete(handlers::delete_user))
        .route("/users/{id}/role", put(handlers::change_user_role))
        .route("/jobs", get(handlers::list_jobs))
        .route("/jobs/{id}", delete(handlers::delete_job))
        .route("/jobs/{id}/status", patch(handlers::set_job_status))
        .route("/categories", post(handlers::create_category))
        .route("/categories/{id}", delete(handlers::delete_category))
        .route("/stats", get(handlers::get_stats))
        .with_state(admin_service)
}
