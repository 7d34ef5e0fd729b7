use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chair_cell::models::{ChairError, ChairStatus};
use chair_cell::services::CleaningService;
use shared_utils::test_utils::{MockRecordResponses, TestConfig};

const TOKEN: &str = "test-token";

#[tokio::test]
async fn test_start_cleaning_creates_missing_chair() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = CleaningService::new(&config);

    Mock::given(method("GET"))
        .and(path("/rest/v1/chairs"))
        .and(query_param("chair_id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/chairs"))
        .and(body_partial_json(json!({ "chair_id": "7", "status": "cleaning" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRecordResponses::chair_response("7", "cleaning")
        ])))
        .mount(&mock_server)
        .await;

    let chair = service
        .start_cleaning("7", Some("routine".to_string()), TOKEN)
        .await
        .expect("start_cleaning should succeed");

    assert_eq!(chair.chair_id, "7");
    assert_eq!(chair.status, ChairStatus::Cleaning);
}

#[tokio::test]
async fn test_start_cleaning_resets_end_time_on_existing_chair() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = CleaningService::new(&config);

    let existing = MockRecordResponses::chair_response("3", "available");

    Mock::given(method("GET"))
        .and(path("/rest/v1/chairs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([existing])))
        .mount(&mock_server)
        .await;

    // The patch must move to cleaning and clear any stale end_time.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/chairs"))
        .and(body_partial_json(json!({ "status": "cleaning", "end_time": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRecordResponses::chair_response("3", "cleaning")
        ])))
        .mount(&mock_server)
        .await;

    let chair = service
        .start_cleaning("3", None, TOKEN)
        .await
        .expect("start_cleaning should succeed");

    assert_eq!(chair.status, ChairStatus::Cleaning);
}

#[tokio::test]
async fn test_finish_cleaning_stamps_end_time_only() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = CleaningService::new(&config);

    let existing = MockRecordResponses::chair_response("7", "cleaning");
    let start_time = existing["start_time"].clone();

    Mock::given(method("GET"))
        .and(path("/rest/v1/chairs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([existing.clone()])))
        .mount(&mock_server)
        .await;

    let mut finished = existing.clone();
    finished["status"] = json!("available");
    finished["end_time"] = json!("2024-01-01T09:00:00Z");

    // The patch body carries status and end_time, never start_time.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/chairs"))
        .and(body_partial_json(json!({ "status": "available" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([finished])))
        .mount(&mock_server)
        .await;

    let chair = service
        .finish_cleaning("7", TOKEN)
        .await
        .expect("finish_cleaning should succeed");

    assert_eq!(chair.status, ChairStatus::Available);
    assert!(chair.end_time.is_some());
    assert_eq!(json!(chair.start_time), start_time);
}

#[tokio::test]
async fn test_finish_cleaning_missing_chair_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = CleaningService::new(&config);

    Mock::given(method("GET"))
        .and(path("/rest/v1/chairs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = service.finish_cleaning("99", TOKEN).await;

    assert_matches!(result, Err(ChairError::NotFound));
}
