use std::sync::Arc;
use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AssignChairRequest, CreateMeetingRequest, DischargeRequest, MarkPresentRequest, SessionError,
};
use crate::services::{AssignmentService, DailyChairsService, MeetingService, QueueService};

fn map_error(err: SessionError) -> AppError {
    match err {
        SessionError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        SessionError::StaleVersion { .. } => AppError::Conflict(err.to_string()),
        SessionError::ChairOccupied { .. } => AppError::Conflict(err.to_string()),
        SessionError::ValidationError(msg) => AppError::ValidationError(msg),
        SessionError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn get_queue(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = QueueService::new(&config);

    let queue = service.get_queue(auth.token()).await.map_err(map_error)?;

    Ok(Json(json!(queue)))
}

#[axum::debug_handler]
pub async fn get_daily_chairs(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = DailyChairsService::new(&config);

    let board = service
        .get_daily_chairs(auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "chairs": board,
        "total": board.len()
    })))
}

#[axum::debug_handler]
pub async fn get_recent(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = MeetingService::new(&config);

    let sessions = service
        .get_recent(patient_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "recent_sessions": sessions })))
}

#[axum::debug_handler]
pub async fn create_meeting(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreateMeetingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = MeetingService::new(&config);

    let meeting = service
        .create_meeting(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(meeting)))
}

#[axum::debug_handler]
pub async fn assign_chair(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<AssignChairRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AssignmentService::new(&config);

    let clinic = service
        .assign_chair(
            request.patient_id,
            request.chair_id,
            request.expected_version,
            auth.token(),
        )
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "active_chairs": clinic.active_chairs,
        "occupancy_version": clinic.occupancy_version
    })))
}

#[axum::debug_handler]
pub async fn mark_present(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<MarkPresentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AssignmentService::new(&config);

    service
        .mark_present(request.patient_id, request.present, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "ok": true })))
}

#[axum::debug_handler]
pub async fn discharge_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<DischargeRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AssignmentService::new(&config);

    let clinic = service
        .discharge_patient(&request.chair_id, request.patient_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "active_chairs": clinic.active_chairs,
        "occupancy_version": clinic.occupancy_version
    })))
}
