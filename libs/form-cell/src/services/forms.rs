use chrono::Utc;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::record_store::RecordStoreClient;

use crate::models::{Form, FormCellError, FormPayload, FormType};

pub struct FormService {
    store: RecordStoreClient,
}

impl FormService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: RecordStoreClient::new(config),
        }
    }

    async fn find(
        &self,
        patient_id: Uuid,
        form_type: FormType,
        auth_token: &str,
    ) -> Result<Option<Form>, FormCellError> {
        self.store
            .select_first(
                "forms",
                &format!("patient_id=eq.{}&type=eq.{}", patient_id, form_type.as_str()),
                Some(auth_token),
            )
            .await
            .map_err(|e| FormCellError::DatabaseError(e.to_string()))
    }

    /// The stored form of the given type, or `None` if the patient has
    /// never filled one in.
    pub async fn get_form(
        &self,
        patient_id: Uuid,
        form_type: FormType,
        auth_token: &str,
    ) -> Result<Option<Form>, FormCellError> {
        self.find(patient_id, form_type, auth_token).await
    }

    /// Upsert keyed on (patient, form type). The whole payload is
    /// replaced, never merged, and `updated_at` is stamped here.
    pub async fn save_form(
        &self,
        patient_id: Uuid,
        payload: FormPayload,
        auth_token: &str,
    ) -> Result<Form, FormCellError> {
        let form_type = payload.form_type();
        let existing = self.find(patient_id, form_type, auth_token).await?;

        let mut body = serde_json::to_value(&payload)
            .map_err(|e| FormCellError::ValidationError(e.to_string()))?;
        body["updated_at"] = json!(Utc::now());

        match existing {
            Some(form) => {
                debug!("Updating {} form for patient {}", form_type.as_str(), patient_id);

                let updated: Vec<Form> = self
                    .store
                    .patch("forms", &format!("id=eq.{}", form.id), body, Some(auth_token))
                    .await
                    .map_err(|e| FormCellError::DatabaseError(e.to_string()))?;

                updated.into_iter().next().ok_or(FormCellError::NotFound)
            }
            None => {
                debug!("Creating {} form for patient {}", form_type.as_str(), patient_id);

                body["patient_id"] = json!(patient_id);
                self.store
                    .insert("forms", body, Some(auth_token))
                    .await
                    .map_err(|e| FormCellError::DatabaseError(e.to_string()))
            }
        }
    }
}
