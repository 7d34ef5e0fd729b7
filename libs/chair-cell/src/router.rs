use std::sync::Arc;
use axum::{middleware, routing::{get, post, put}, Router};
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn create_chair_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_chairs))
        .route("/{chair_id}", get(get_chair))
        .route("/{chair_id}/start-cleaning", post(start_cleaning))
        .route("/{chair_id}/finish-cleaning", post(finish_cleaning))
        .route("/{chair_id}/status", put(set_status))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
