use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub record_store_url: String,
    pub record_store_api_key: String,
    pub clinic_id: String,
    pub strict_assignment: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            record_store_url: "http://localhost:54321".to_string(),
            record_store_api_key: "test-api-key".to_string(),
            clinic_id: "11111111-1111-1111-1111-111111111111".to_string(),
            strict_assignment: false,
        }
    }
}

impl TestConfig {
    /// Point the config at a mock record store (wiremock URI).
    pub fn with_store_url(url: &str) -> Self {
        Self {
            record_store_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn strict(url: &str) -> Self {
        Self {
            record_store_url: url.to_string(),
            strict_assignment: true,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            record_store_url: self.record_store_url.clone(),
            record_store_api_key: self.record_store_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            clinic_id: self.clinic_id.clone(),
            strict_assignment: self.strict_assignment,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "nurse".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn nurse(email: &str) -> Self {
        Self::new(email, "nurse")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            token_identifier: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned record-store rows for wiremock-backed tests.
pub struct MockRecordResponses;

impl MockRecordResponses {
    pub fn user_response(user_id: &str, email: &str, name: &str) -> Value {
        json!({
            "id": user_id,
            "token_identifier": format!("idp|{}", user_id),
            "email": email,
            "first_name": name,
            "last_name": "Test",
            "role": "patient",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_response(patient_id: &str, user_id: &str, present: bool, block: Option<&str>) -> Value {
        json!({
            "id": patient_id,
            "user_id": user_id,
            "present": present,
            "block": block,
            "priority": "stable",
            "alert": null,
            "code": "PT-001",
            "dry_weight": 62.5,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn meeting_response(patient_id: &str, date: &str, status: &str, chair_id: Option<&str>) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "patient_id": patient_id,
            "date": date,
            "status": status,
            "chair_id": chair_id,
            "present": true,
            "weight": null,
            "condition": null,
            "schedule": null,
            "title": "Hemodialysis Session"
        })
    }

    pub fn chair_response(chair_id: &str, status: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "chair_id": chair_id,
            "status": status,
            "start_time": "2024-01-01T08:00:00Z",
            "end_time": null,
            "notes": null
        })
    }

    pub fn clinic_response(clinic_id: &str, active_chairs: Value, occupancy_version: i64) -> Value {
        json!({
            "id": clinic_id,
            "name": "Default Clinic",
            "active_chairs": active_chairs,
            "occupancy_version": occupancy_version
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.record_store_url, "http://localhost:54321");
        assert_eq!(app_config.record_store_api_key, "test-api-key");
        assert!(!app_config.jwt_secret.is_empty());
        assert!(!app_config.strict_assignment);
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::nurse("nurse@example.com");
        assert_eq!(user.email, "nurse@example.com");
        assert_eq!(user.role, "nurse");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.role, Some(user.role.clone()));
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let secret = "test-secret";
        let token = JwtTestUtils::create_test_token(&user, secret, Some(1));

        assert!(token.contains('.'));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_token_round_trip() {
        let config = TestConfig::default();
        let test_user = TestUser::patient("p@example.com");
        let token = JwtTestUtils::create_test_token(&test_user, &config.jwt_secret, Some(1));

        let user = crate::jwt::validate_token(&token, &config.jwt_secret)
            .expect("token should validate");
        assert_eq!(user.id, test_user.id);
        assert_eq!(user.role, Some("patient".to_string()));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = TestConfig::default();
        let test_user = TestUser::default();
        let token = JwtTestUtils::create_expired_token(&test_user, &config.jwt_secret);

        assert_matches!(
            crate::jwt::validate_token(&token, &config.jwt_secret),
            Err(msg) if msg == "Token expired"
        );
    }
}
