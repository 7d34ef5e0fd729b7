use chrono::Utc;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::record_store::RecordStoreClient;

use crate::models::{CreateMeetingRequest, Meeting, SessionError};

pub struct MeetingService {
    store: RecordStoreClient,
}

impl MeetingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: RecordStoreClient::new(config),
        }
    }

    /// The three most recent sessions for a patient, newest first.
    pub async fn get_recent(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Meeting>, SessionError> {
        self.store
            .select(
                "meetings",
                &format!("patient_id=eq.{}&order=date.desc&limit=3", patient_id),
                Some(auth_token),
            )
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))
    }

    /// Record a session snapshot. Always inserts; same-day consolidation is
    /// the assignment flow's job, history keeps every row.
    pub async fn create_meeting(
        &self,
        request: CreateMeetingRequest,
        auth_token: &str,
    ) -> Result<Meeting, SessionError> {
        let date = request.date.unwrap_or_else(|| Utc::now().date_naive());
        debug!("Recording meeting for patient {} on {}", request.patient_id, date);

        self.store
            .insert(
                "meetings",
                json!({
                    "patient_id": request.patient_id,
                    "date": date,
                    "status": request.status,
                    "chair_id": request.chair_id,
                    "present": false,
                    "weight": request.weight,
                    "condition": request.condition,
                    "schedule": request.schedule,
                    "title": request.title,
                }),
                Some(auth_token),
            )
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))
    }
}
