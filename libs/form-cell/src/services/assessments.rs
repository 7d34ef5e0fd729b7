use serde_json::json;
use tracing::debug;
use urlencoding::encode;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::record_store::RecordStoreClient;

use crate::models::{FormCellError, MonthlyAssessment, SaveAssessmentRequest};

pub struct AssessmentService {
    store: RecordStoreClient,
}

impl AssessmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: RecordStoreClient::new(config),
        }
    }

    fn key_filter(patient_id: Uuid, month: &str, year: i32, kind: &str) -> String {
        format!(
            "patient_id=eq.{}&month=eq.{}&year=eq.{}&type=eq.{}",
            patient_id,
            encode(month),
            year,
            encode(kind)
        )
    }

    /// The assessment for the given month/year/type key, or `None` if none
    /// has been recorded.
    pub async fn get_assessment(
        &self,
        patient_id: Uuid,
        month: &str,
        year: i32,
        kind: &str,
        auth_token: &str,
    ) -> Result<Option<MonthlyAssessment>, FormCellError> {
        self.store
            .select_first(
                "monthly_assessments",
                &Self::key_filter(patient_id, month, year, kind),
                Some(auth_token),
            )
            .await
            .map_err(|e| FormCellError::DatabaseError(e.to_string()))
    }

    /// Upsert keyed on (patient, month, year, type). An existing record gets
    /// only its `data` replaced; the key fields never change.
    pub async fn save_assessment(
        &self,
        patient_id: Uuid,
        request: SaveAssessmentRequest,
        auth_token: &str,
    ) -> Result<MonthlyAssessment, FormCellError> {
        let existing = self
            .get_assessment(patient_id, &request.month, request.year, &request.kind, auth_token)
            .await?;

        match existing {
            Some(assessment) => {
                debug!(
                    "Updating {} assessment for patient {} ({} {})",
                    request.kind, patient_id, request.month, request.year
                );

                let updated: Vec<MonthlyAssessment> = self
                    .store
                    .patch(
                        "monthly_assessments",
                        &format!("id=eq.{}", assessment.id),
                        json!({ "data": request.data }),
                        Some(auth_token),
                    )
                    .await
                    .map_err(|e| FormCellError::DatabaseError(e.to_string()))?;

                updated.into_iter().next().ok_or(FormCellError::NotFound)
            }
            None => {
                debug!(
                    "Creating {} assessment for patient {} ({} {})",
                    request.kind, patient_id, request.month, request.year
                );

                self.store
                    .insert(
                        "monthly_assessments",
                        json!({
                            "patient_id": patient_id,
                            "month": request.month,
                            "year": request.year,
                            "type": request.kind,
                            "data": request.data,
                        }),
                        Some(auth_token),
                    )
                    .await
                    .map_err(|e| FormCellError::DatabaseError(e.to_string()))
            }
        }
    }
}
