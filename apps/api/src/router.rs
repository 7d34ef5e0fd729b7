use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use auth_cell::router::auth_routes;
use chair_cell::router::create_chair_router;
use form_cell::router::{create_assessment_router, create_form_router};
use patient_cell::router::create_patient_router;
use session_cell::router::create_session_router;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "RenalFlow Clinic API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/patients", create_patient_router(state.clone()))
        .nest("/sessions", create_session_router(state.clone()))
        .nest("/chairs", create_chair_router(state.clone()))
        .nest("/forms", create_form_router(state.clone()))
        .nest("/assessments", create_assessment_router(state.clone()))
}
