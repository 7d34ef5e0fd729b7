use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;
use urlencoding::encode;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::record_store::RecordStoreClient;

use crate::models::{
    CreatePatientRequest, Patient, PatientError, PatientProfile, PatientSearchQuery,
    UpdatePatientRequest,
};

pub struct PatientService {
    store: RecordStoreClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: RecordStoreClient::new(config),
        }
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Creating patient record for user {}", request.user_id);

        // patients are unique by user_id
        let existing: Option<Patient> = self
            .store
            .select_first("patients", &format!("user_id=eq.{}", request.user_id), Some(auth_token))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if existing.is_some() {
            return Err(PatientError::AlreadyLinked { user_id: request.user_id });
        }

        let patient: Patient = self
            .store
            .insert(
                "patients",
                json!({
                    "user_id": request.user_id,
                    "present": false,
                    "block": request.block,
                    "priority": request.priority.unwrap_or_default(),
                    "alert": request.alert,
                    "code": request.code,
                    "dry_weight": request.dry_weight,
                    "created_at": Utc::now().to_rfc3339(),
                    "updated_at": Utc::now().to_rfc3339(),
                }),
                Some(auth_token),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        debug!("Patient record created with id {}", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<Patient, PatientError> {
        self.store
            .select_first("patients", &format!("id=eq.{}", patient_id), Some(auth_token))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?
            .ok_or(PatientError::NotFound)
    }

    pub async fn get_by_user(&self, user_id: Uuid, auth_token: &str) -> Result<Patient, PatientError> {
        self.store
            .select_first("patients", &format!("user_id=eq.{}", user_id), Some(auth_token))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?
            .ok_or(PatientError::NotFound)
    }

    /// All patients, optionally narrowed to the `present` flag (indexed).
    pub async fn list_patients(
        &self,
        present: Option<bool>,
        auth_token: &str,
    ) -> Result<Vec<Patient>, PatientError> {
        let query = match present {
            Some(p) => format!("present=eq.{}&order=created_at.asc", p),
            None => "order=created_at.asc".to_string(),
        };

        self.store
            .select("patients", &query, Some(auth_token))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    /// Substring search over patient code and user names. Collections are
    /// small, so the name half joins in memory.
    pub async fn search_patients(
        &self,
        query: PatientSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Patient>, PatientError> {
        debug!("Searching patients: {:?}", query);

        let limit = query.limit.unwrap_or(50);
        let offset = query.offset.unwrap_or(0);

        if let Some(code) = query.code {
            let path = format!(
                "code=ilike.%{}%&limit={}&offset={}",
                encode(&code),
                limit,
                offset
            );
            return self
                .store
                .select("patients", &path, Some(auth_token))
                .await
                .map_err(|e| PatientError::DatabaseError(e.to_string()));
        }

        if let Some(name) = query.name {
            let user_query = format!(
                "or=(first_name.ilike.%{}%,last_name.ilike.%{}%)&role=eq.patient",
                encode(&name),
                encode(&name)
            );
            let users: Vec<Value> = self
                .store
                .select("users", &user_query, Some(auth_token))
                .await
                .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

            if users.is_empty() {
                return Ok(vec![]);
            }

            let ids: Vec<String> = users
                .iter()
                .filter_map(|u| u["id"].as_str().map(|s| s.to_string()))
                .collect();
            let path = format!(
                "user_id=in.({})&limit={}&offset={}",
                ids.join(","),
                limit,
                offset
            );
            return self
                .store
                .select("patients", &path, Some(auth_token))
                .await
                .map_err(|e| PatientError::DatabaseError(e.to_string()));
        }

        self.store
            .select("patients", &format!("limit={}&offset={}", limit, offset), Some(auth_token))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient {}", patient_id);

        let mut update_data = serde_json::Map::new();

        if let Some(block) = request.block {
            update_data.insert("block".to_string(), json!(block));
        }
        if let Some(priority) = request.priority {
            update_data.insert("priority".to_string(), json!(priority));
        }
        if let Some(alert) = request.alert {
            update_data.insert("alert".to_string(), json!(alert));
        }
        if let Some(code) = request.code {
            update_data.insert("code".to_string(), json!(code));
        }
        if let Some(dry_weight) = request.dry_weight {
            update_data.insert("dry_weight".to_string(), json!(dry_weight));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let mut patched: Vec<Patient> = self
            .store
            .patch(
                "patients",
                &format!("id=eq.{}", patient_id),
                Value::Object(update_data),
                Some(auth_token),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if patched.is_empty() {
            return Err(PatientError::NotFound);
        }
        Ok(patched.remove(0))
    }

    /// Toggle the in-building flag. The day's meeting record is owned by the
    /// session cell; this only touches the patient document.
    pub async fn set_presence(
        &self,
        patient_id: Uuid,
        present: bool,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Setting presence for patient {} to {}", patient_id, present);

        let mut patched: Vec<Patient> = self
            .store
            .patch(
                "patients",
                &format!("id=eq.{}", patient_id),
                json!({
                    "present": present,
                    "updated_at": Utc::now().to_rfc3339(),
                }),
                Some(auth_token),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if patched.is_empty() {
            return Err(PatientError::NotFound);
        }
        Ok(patched.remove(0))
    }

    /// Merge a patient record with its user identity for display.
    pub async fn get_profile(
        &self,
        patient: Patient,
        auth_token: &str,
    ) -> Result<PatientProfile, PatientError> {
        let user: Option<Value> = self
            .store
            .select_first("users", &format!("id=eq.{}", patient.user_id), Some(auth_token))
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let user = user.unwrap_or_else(|| json!({}));

        Ok(PatientProfile {
            first_name: user["first_name"].as_str().map(|s| s.to_string()),
            last_name: user["last_name"].as_str().map(|s| s.to_string()),
            email: user["email"].as_str().map(|s| s.to_string()),
            patient,
        })
    }
}
