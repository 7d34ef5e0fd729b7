use std::sync::Arc;
use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{ChairError, SetStatusRequest, StartCleaningRequest};
use crate::services::CleaningService;

fn map_error(err: ChairError) -> AppError {
    match err {
        ChairError::NotFound => AppError::NotFound("Chair not found".to_string()),
        ChairError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_chairs(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = CleaningService::new(&config);

    let chairs = service.list_chairs(auth.token()).await.map_err(map_error)?;

    Ok(Json(json!({
        "chairs": chairs,
        "total": chairs.len()
    })))
}

#[axum::debug_handler]
pub async fn get_chair(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(chair_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = CleaningService::new(&config);

    let chair = service
        .get_by_chair_id(&chair_id, auth.token())
        .await
        .map_err(map_error)?;

    // Chairs are created lazily; an unknown id is an available chair.
    Ok(Json(json!(chair)))
}

#[axum::debug_handler]
pub async fn start_cleaning(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(chair_id): Path<String>,
    Json(request): Json<StartCleaningRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CleaningService::new(&config);

    let chair = service
        .start_cleaning(&chair_id, request.notes, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(chair)))
}

#[axum::debug_handler]
pub async fn finish_cleaning(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(chair_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = CleaningService::new(&config);

    let chair = service
        .finish_cleaning(&chair_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(chair)))
}

#[axum::debug_handler]
pub async fn set_status(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(chair_id): Path<String>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CleaningService::new(&config);

    let chair = service
        .set_status(&chair_id, request.status, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(chair)))
}
