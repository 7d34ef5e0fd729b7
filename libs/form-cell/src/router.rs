use std::sync::Arc;
use axum::{middleware, routing::{get, put}, Router};
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn create_form_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/{patient_id}/{form_type}", get(get_form))
        .route("/{patient_id}", put(save_form))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}

pub fn create_assessment_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/{patient_id}", get(get_assessment))
        .route("/{patient_id}", put(save_assessment))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
