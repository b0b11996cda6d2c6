//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing).

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The dashboard frontend is served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Center-wide views
        .route("/center/queue", get(handlers::get_queue))
        .route("/center/power", get(handlers::get_power))
        // Jobs
        .route("/jobs", get(handlers::list_jobs))
        .route("/jobs/{job_id}", get(handlers::get_job))
        .route("/jobs/{job_id}/metrics", get(handlers::get_job_metrics))
        .route("/jobs/{job_id}/panels/{panel}", get(handlers::get_job_panel))
        .route("/jobs/{job_id}/power", get(handlers::get_job_power))
        .route("/jobs/{job_id}/roofline", get(handlers::get_job_roofline))
        // Comparison
        .route("/compare", get(handlers::compare_jobs))
        .route("/compare/metrics", get(handlers::get_compare_catalog));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{DashboardRepository, LocalRepository};
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn DashboardRepository>;
        let state = AppState::new(repo);
        let _router = create_router(state);
    }
}
