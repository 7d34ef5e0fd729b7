use std::sync::Arc;
use axum::{
    extract::{Extension, Path, Query, State},
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
    CreatePatientRequest, PatientError, PatientSearchQuery, SetPresenceRequest,
    UpdatePatientRequest,
};
use crate::services::PatientService;

fn map_error(err: PatientError) -> AppError {
    match err {
        PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
        PatientError::AlreadyLinked { user_id } => {
            AppError::Conflict(format!("Patient already linked to user {}", user_id))
        }
        PatientError::ValidationError(msg) => AppError::ValidationError(msg),
        PatientError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn create_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .create_patient(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .get_patient(patient_id, auth.token())
        .await
        .map_err(map_error)?;
    let profile = service
        .get_profile(patient, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patients = service
        .list_patients(None, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn search_patients(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patients = service
        .search_patients(query, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .update_patient(patient_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn set_presence(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<SetPresenceRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .set_presence(patient_id, request.present, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(patient)))
}
