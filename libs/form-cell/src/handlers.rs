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
    AssessmentQuery, FormCellError, FormPayload, FormType, SaveAssessmentRequest,
};
use crate::services::{AssessmentService, FormService};

fn map_error(err: FormCellError) -> AppError {
    match err {
        FormCellError::NotFound => AppError::NotFound("Record not found".to_string()),
        FormCellError::ValidationError(msg) => AppError::ValidationError(msg),
        FormCellError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn get_form(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path((patient_id, form_type)): Path<(Uuid, FormType)>,
) -> Result<Json<Value>, AppError> {
    let service = FormService::new(&config);

    let form = service
        .get_form(patient_id, form_type, auth.token())
        .await
        .map_err(map_error)?;

    // Absent forms are a normal state, not an error.
    Ok(Json(json!(form)))
}

#[axum::debug_handler]
pub async fn save_form(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Json(payload): Json<FormPayload>,
) -> Result<Json<Value>, AppError> {
    let service = FormService::new(&config);

    let form = service
        .save_form(patient_id, payload, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(form)))
}

#[axum::debug_handler]
pub async fn get_assessment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Query(query): Query<AssessmentQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AssessmentService::new(&config);

    let assessment = service
        .get_assessment(patient_id, &query.month, query.year, &query.kind, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(assessment)))
}

#[axum::debug_handler]
pub async fn save_assessment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<SaveAssessmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AssessmentService::new(&config);

    let assessment = service
        .save_assessment(patient_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(assessment)))
}
