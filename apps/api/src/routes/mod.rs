pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_start_session))
        .route("/api/v1/sessions/:id", delete(handlers::handle_end_session))
        // Evaluation
        .route("/api/v1/evaluations", post(handlers::handle_evaluate))
        .route("/api/v1/results", get(handlers::handle_get_results))
        .route(
            "/api/v1/results/export.csv",
            get(handlers::handle_export_csv),
        )
        .route("/api/v1/results/table", get(handlers::handle_results_table))
        // Credential check (advisory)
        .route(
            "/api/v1/credentials/check",
            post(handlers::handle_check_credential),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
