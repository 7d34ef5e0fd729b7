use chrono::Utc;
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::record_store::RecordStoreClient;

use crate::models::{Chair, ChairError, ChairStatus};

/// Cleaning lifecycle for chairs. Transitions are deliberately unguarded:
/// staff can start or finish cleaning from any state, and occupancy is
/// tracked separately on the clinic record.
pub struct CleaningService {
    store: RecordStoreClient,
}

impl CleaningService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: RecordStoreClient::new(config),
        }
    }

    pub async fn list_chairs(&self, auth_token: &str) -> Result<Vec<Chair>, ChairError> {
        self.store
            .select("chairs", "order=chair_id.asc", Some(auth_token))
            .await
            .map_err(|e| ChairError::DatabaseError(e.to_string()))
    }

    pub async fn get_by_chair_id(
        &self,
        chair_id: &str,
        auth_token: &str,
    ) -> Result<Option<Chair>, ChairError> {
        self.store
            .select_first("chairs", &format!("chair_id=eq.{}", chair_id), Some(auth_token))
            .await
            .map_err(|e| ChairError::DatabaseError(e.to_string()))
    }

    /// Chairs currently in the cleaning state.
    pub async fn list_cleaning(&self, auth_token: &str) -> Result<Vec<Chair>, ChairError> {
        self.store
            .select("chairs", "status=eq.cleaning", Some(auth_token))
            .await
            .map_err(|e| ChairError::DatabaseError(e.to_string()))
    }

    /// Upsert the chair into the cleaning state with a fresh start time.
    /// Any previous end time is cleared.
    pub async fn start_cleaning(
        &self,
        chair_id: &str,
        notes: Option<String>,
        auth_token: &str,
    ) -> Result<Chair, ChairError> {
        debug!("Starting cleaning for chair {}", chair_id);

        let now = Utc::now().to_rfc3339();
        let existing = self.get_by_chair_id(chair_id, auth_token).await?;

        if let Some(chair) = existing {
            let mut patched: Vec<Chair> = self
                .store
                .patch(
                    "chairs",
                    &format!("id=eq.{}", chair.id),
                    json!({
                        "status": ChairStatus::Cleaning,
                        "start_time": now,
                        "end_time": null,
                        "notes": notes,
                    }),
                    Some(auth_token),
                )
                .await
                .map_err(|e| ChairError::DatabaseError(e.to_string()))?;

            if patched.is_empty() {
                return Err(ChairError::NotFound);
            }
            return Ok(patched.remove(0));
        }

        self.store
            .insert(
                "chairs",
                json!({
                    "chair_id": chair_id,
                    "status": ChairStatus::Cleaning,
                    "start_time": now,
                    "notes": notes,
                }),
                Some(auth_token),
            )
            .await
            .map_err(|e| ChairError::DatabaseError(e.to_string()))
    }

    /// Mark the chair available again, stamping the end time. The start time
    /// is left as the cleaning started it.
    pub async fn finish_cleaning(&self, chair_id: &str, auth_token: &str) -> Result<Chair, ChairError> {
        debug!("Finishing cleaning for chair {}", chair_id);

        let existing = self
            .get_by_chair_id(chair_id, auth_token)
            .await?
            .ok_or(ChairError::NotFound)?;

        let mut patched: Vec<Chair> = self
            .store
            .patch(
                "chairs",
                &format!("id=eq.{}", existing.id),
                json!({
                    "status": ChairStatus::Available,
                    "end_time": Utc::now().to_rfc3339(),
                }),
                Some(auth_token),
            )
            .await
            .map_err(|e| ChairError::DatabaseError(e.to_string()))?;

        if patched.is_empty() {
            return Err(ChairError::NotFound);
        }
        Ok(patched.remove(0))
    }

    /// Reset helper for staff, upserting an arbitrary status.
    pub async fn set_status(
        &self,
        chair_id: &str,
        status: ChairStatus,
        auth_token: &str,
    ) -> Result<Chair, ChairError> {
        let now = Utc::now().to_rfc3339();
        let existing = self.get_by_chair_id(chair_id, auth_token).await?;

        if let Some(chair) = existing {
            let mut patched: Vec<Chair> = self
                .store
                .patch(
                    "chairs",
                    &format!("id=eq.{}", chair.id),
                    json!({
                        "status": status,
                        "start_time": now,
                    }),
                    Some(auth_token),
                )
                .await
                .map_err(|e| ChairError::DatabaseError(e.to_string()))?;

            if patched.is_empty() {
                return Err(ChairError::NotFound);
            }
            return Ok(patched.remove(0));
        }

        self.store
            .insert(
                "chairs",
                json!({
                    "chair_id": chair_id,
                    "status": status,
                    "start_time": now,
                }),
                Some(auth_token),
            )
            .await
            .map_err(|e| ChairError::DatabaseError(e.to_string()))
    }
}
