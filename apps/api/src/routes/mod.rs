pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/interviews",
            get(handlers::handle_list_interviews).post(handlers::handle_create_interview),
        )
        .route(
            "/api/v1/interviews/:mock_id",
            get(handlers::handle_get_interview).delete(handlers::handle_delete_interview),
        )
        .route(
            "/api/v1/interviews/:mock_id/feedback",
            get(handlers::handle_get_feedback),
        )
        .route(
            "/api/v1/interviews/:mock_id/questions/:index/answers",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:mock_id/questions/:index/capture",
            get(handlers::handle_capture_socket),
        )
        .with_state(state)
}
