use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::HeaderMap,
    Json,
};
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::jwt;

use crate::models::StoreUserRequest;
use crate::services::UserService;

// Helper function to extract token
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    Ok(auth_value[7..].to_string())
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;

    match jwt::validate_token(&token, &config.jwt_secret) {
        Ok(user) => {
            let response = TokenResponse {
                valid: true,
                user_id: user.id,
                email: user.email,
                role: user.role,
            };

            Ok(Json(response))
        }
        Err(err) => Err(AppError::Auth(err)),
    }
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    debug!("Verifying token");

    let token = extract_bearer_token(&headers)?;

    match jwt::validate_token(&token, &config.jwt_secret) {
        Ok(_) => Ok(Json(json!({ "valid": true }))),
        Err(_) => Ok(Json(json!({ "valid": false }))),
    }
}

#[axum::debug_handler]
pub async fn store_user(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<StoreUserRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    debug!("Storing user for subject {} (caller {})", request.token_identifier, user.id);

    let token = extract_bearer_token(&headers)?;
    let service = UserService::new(&config);

    let stored = service
        .store_user(request, &token)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(stored)))
}
