use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use form_cell::models::{FormCellError, SaveAssessmentRequest};
use form_cell::services::AssessmentService;
use shared_utils::test_utils::TestConfig;

const TOKEN: &str = "test-token";

fn assessment_record(id: &Uuid, patient_id: &Uuid, data: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "patient_id": patient_id,
        "month": "June",
        "year": 2024,
        "type": "patientCard",
        "data": data
    })
}

fn save_request(data: serde_json::Value) -> SaveAssessmentRequest {
    SaveAssessmentRequest {
        month: "June".to_string(),
        year: 2024,
        kind: "patientCard".to_string(),
        data,
    }
}

#[tokio::test]
async fn test_get_missing_assessment_returns_none() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = AssessmentService::new(&config);

    Mock::given(method("GET"))
        .and(path("/rest/v1/monthly_assessments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let assessment = service
        .get_assessment(Uuid::new_v4(), "June", 2024, "patientCard", TOKEN)
        .await
        .expect("lookup should succeed");

    assert!(assessment.is_none());
}

#[tokio::test]
async fn test_get_assessment_filters_on_full_key() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = AssessmentService::new(&config);
    let patient_id = Uuid::new_v4();
    let assessment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/monthly_assessments"))
        .and(query_param("patient_id", format!("eq.{}", patient_id)))
        .and(query_param("month", "eq.June"))
        .and(query_param("year", "eq.2024"))
        .and(query_param("type", "eq.patientCard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([assessment_record(
            &assessment_id,
            &patient_id,
            json!({ "weight": "62" })
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let assessment = service
        .get_assessment(patient_id, "June", 2024, "patientCard", TOKEN)
        .await
        .expect("lookup should succeed")
        .expect("assessment should exist");

    assert_eq!(assessment.id, assessment_id);
    assert_eq!(assessment.kind, "patientCard");
}

#[tokio::test]
async fn test_save_new_assessment_inserts_with_key_fields() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = AssessmentService::new(&config);
    let patient_id = Uuid::new_v4();
    let assessment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/monthly_assessments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/monthly_assessments"))
        .and(body_partial_json(json!({
            "patient_id": patient_id,
            "month": "June",
            "year": 2024,
            "type": "patientCard"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([assessment_record(
            &assessment_id,
            &patient_id,
            json!({ "weight": "62" })
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let saved = service
        .save_assessment(patient_id, save_request(json!({ "weight": "62" })), TOKEN)
        .await
        .expect("save should succeed");

    assert_eq!(saved.id, assessment_id);
}

#[tokio::test]
async fn test_save_existing_assessment_patches_data_only() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = AssessmentService::new(&config);
    let patient_id = Uuid::new_v4();
    let assessment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/monthly_assessments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([assessment_record(
            &assessment_id,
            &patient_id,
            json!({ "weight": "62" })
        )])))
        .mount(&mock_server)
        .await;

    // The patch addresses the row by id and replaces data wholesale.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/monthly_assessments"))
        .and(query_param("id", format!("eq.{}", assessment_id)))
        .and(body_partial_json(json!({ "data": { "weight": "63" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([assessment_record(
            &assessment_id,
            &patient_id,
            json!({ "weight": "63" })
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let saved = service
        .save_assessment(patient_id, save_request(json!({ "weight": "63" })), TOKEN)
        .await
        .expect("save should succeed");

    assert_eq!(saved.data["weight"], json!("63"));
}

#[tokio::test]
async fn test_save_with_vanished_row_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    let service = AssessmentService::new(&config);
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/monthly_assessments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([assessment_record(
            &Uuid::new_v4(),
            &patient_id,
            json!({})
        )])))
        .mount(&mock_server)
        .await;

    // Row deleted between the lookup and the patch.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/monthly_assessments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = service
        .save_assessment(patient_id, save_request(json!({})), TOKEN)
        .await;

    assert_matches!(result, Err(FormCellError::NotFound));
}
