use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    extract::{Extension, State},
    http::{HeaderMap, HeaderValue},
    Json,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::handlers::{store_user, validate_token, verify_token};
use auth_cell::models::StoreUserRequest;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, MockRecordResponses, TestConfig, TestUser};

fn create_test_config() -> AppConfig {
    TestConfig::default().to_app_config()
}

fn create_auth_header(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "authorization",
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

#[tokio::test]
async fn test_validate_token_success() {
    let config = Arc::new(create_test_config());
    let user = TestUser::nurse("nurse@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(24));
    let headers = create_auth_header(&token);

    let result = validate_token(State(config), headers).await;

    assert!(result.is_ok());
    let response = result.unwrap().0;
    assert!(response.valid);
    assert_eq!(response.user_id, user.id);
    assert_eq!(response.email, Some(user.email));
    assert_eq!(response.role, Some(user.role));
}

#[tokio::test]
async fn test_validate_token_missing_header() {
    let config = Arc::new(create_test_config());
    let headers = HeaderMap::new();

    let result = validate_token(State(config), headers).await;

    assert_matches!(
        result,
        Err(AppError::Auth(msg)) if msg == "Missing authorization header"
    );
}

#[tokio::test]
async fn test_validate_token_expired() {
    let config = Arc::new(create_test_config());
    let user = TestUser::default();
    let token = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);
    let headers = create_auth_header(&token);

    let result = validate_token(State(config), headers).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_verify_token_invalid_signature() {
    let config = Arc::new(create_test_config());
    let user = TestUser::default();
    let token = JwtTestUtils::create_invalid_signature_token(&user);
    let headers = create_auth_header(&token);

    let result = verify_token(State(config), headers).await;

    assert!(result.is_ok());
    let body = result.unwrap().0;
    assert_eq!(body["valid"], json!(false));
}

#[tokio::test]
async fn test_store_user_creates_new_record() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_arc();

    let caller = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&caller, &config.jwt_secret, Some(24));
    let headers = create_auth_header(&token);

    // No existing user for this subject
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("token_identifier", "eq.idp|new-subject"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRecordResponses::user_response(
                "7c3d5a9e-0000-0000-0000-000000000001",
                "p@example.com",
                "Pat"
            )
        ])))
        .mount(&mock_server)
        .await;

    let request = StoreUserRequest {
        token_identifier: "idp|new-subject".to_string(),
        email: "p@example.com".to_string(),
        first_name: Some("Pat".to_string()),
        last_name: Some("Test".to_string()),
        profile_picture_url: None,
    };

    let result = store_user(
        State(config),
        Extension(caller.to_user()),
        headers,
        Json(request),
    )
    .await;

    assert!(result.is_ok());
    let body = result.unwrap().0;
    assert_eq!(body["email"], json!("p@example.com"));
    assert_eq!(body["role"], json!("patient"));
}

#[tokio::test]
async fn test_store_user_refreshes_existing_record() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_arc();

    let caller = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&caller, &config.jwt_secret, Some(24));
    let headers = create_auth_header(&token);

    let existing = MockRecordResponses::user_response(
        "7c3d5a9e-0000-0000-0000-000000000002",
        "old@example.com",
        "Old",
    );

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([existing])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRecordResponses::user_response(
                "7c3d5a9e-0000-0000-0000-000000000002",
                "new@example.com",
                "New"
            )
        ])))
        .mount(&mock_server)
        .await;

    let request = StoreUserRequest {
        token_identifier: "idp|existing-subject".to_string(),
        email: "new@example.com".to_string(),
        first_name: Some("New".to_string()),
        last_name: None,
        profile_picture_url: None,
    };

    let result = store_user(
        State(config),
        Extension(caller.to_user()),
        headers,
        Json(request),
    )
    .await;

    assert!(result.is_ok());
    let body = result.unwrap().0;
    assert_eq!(body["email"], json!("new@example.com"));
}
