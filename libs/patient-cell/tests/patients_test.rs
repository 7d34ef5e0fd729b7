use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::models::{CreatePatientRequest, PatientError, PatientSearchQuery};
use patient_cell::services::PatientService;
use shared_utils::test_utils::{MockRecordResponses, TestConfig};

const TOKEN: &str = "test-token";

fn create_request(user_id: Uuid) -> CreatePatientRequest {
    CreatePatientRequest {
        user_id,
        block: Some("1".to_string()),
        priority: None,
        alert: None,
        code: Some("PT-001".to_string()),
        dry_weight: Some(62.5),
    }
}

#[tokio::test]
async fn test_create_patient_inserts_record() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = PatientService::new(&config);
    let user_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    // New patients always start absent with the stable priority.
    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .and(body_partial_json(json!({
            "user_id": user_id,
            "present": false,
            "priority": "stable",
            "block": "1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRecordResponses::patient_response(
                &patient_id.to_string(),
                &user_id.to_string(),
                false,
                Some("1")
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let patient = service
        .create_patient(create_request(user_id), TOKEN)
        .await
        .expect("create should succeed");

    assert_eq!(patient.id, patient_id);
    assert_eq!(patient.user_id, user_id);
}

#[tokio::test]
async fn test_create_patient_rejects_duplicate_user_link() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = PatientService::new(&config);
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRecordResponses::patient_response(
                &Uuid::new_v4().to_string(),
                &user_id.to_string(),
                false,
                None
            )
        ])))
        .mount(&mock_server)
        .await;

    let result = service.create_patient(create_request(user_id), TOKEN).await;

    assert_matches!(
        result,
        Err(PatientError::AlreadyLinked { user_id: linked }) if linked == user_id
    );
}

#[tokio::test]
async fn test_set_presence_unknown_patient_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = PatientService::new(&config);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = service.set_presence(Uuid::new_v4(), true, TOKEN).await;

    assert_matches!(result, Err(PatientError::NotFound));
}

#[tokio::test]
async fn test_set_presence_patches_flag() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = PatientService::new(&config);
    let patient_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .and(body_partial_json(json!({ "present": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRecordResponses::patient_response(
                &patient_id.to_string(),
                &Uuid::new_v4().to_string(),
                true,
                Some("2")
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let patient = service
        .set_presence(patient_id, true, TOKEN)
        .await
        .expect("presence update should succeed");

    assert!(patient.present);
}

#[tokio::test]
async fn test_search_by_name_joins_through_users() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = PatientService::new(&config);
    let user_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRecordResponses::user_response(&user_id.to_string(), "ana@example.com", "Ana")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("user_id", format!("in.({})", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRecordResponses::patient_response(
                &patient_id.to_string(),
                &user_id.to_string(),
                true,
                Some("1")
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = PatientSearchQuery {
        name: Some("Ana".to_string()),
        code: None,
        limit: None,
        offset: None,
    };

    let patients = service
        .search_patients(query, TOKEN)
        .await
        .expect("search should succeed");

    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].id, patient_id);
}

#[tokio::test]
async fn test_search_by_name_with_no_user_match_is_empty() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = PatientService::new(&config);

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    // No patients query should go out when no user matched.
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let query = PatientSearchQuery {
        name: Some("Nobody".to_string()),
        code: None,
        limit: None,
        offset: None,
    };

    let patients = service
        .search_patients(query, TOKEN)
        .await
        .expect("search should succeed");

    assert!(patients.is_empty());
}
