use std::sync::Arc;
use axum::{middleware, routing::{get, post}, Router};
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn create_session_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/queue", get(get_queue))
        .route("/daily-chairs", get(get_daily_chairs))
        .route("/recent/{patient_id}", get(get_recent))
        .route("/", post(create_meeting))
        .route("/assign-chair", post(assign_chair))
        .route("/mark-present", post(mark_present))
        .route("/discharge", post(discharge_patient))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
