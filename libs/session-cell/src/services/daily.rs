use futures::future::join_all;
use serde_json::Value;
use tracing::debug;

use chair_cell::models::Chair;
use chair_cell::services::CleaningService;
use patient_cell::models::Patient;
use shared_config::AppConfig;
use shared_database::record_store::RecordStoreClient;

use crate::models::{Clinic, DailyChairEntry, DailyChairPatient, SessionError};

/// Fold cleaning chairs into the occupied board as pseudo-patients. A chair
/// that is both occupied and still flagged cleaning shows its occupant; the
/// records are not cross-validated.
pub fn merge_daily_chairs(
    mut occupied: Vec<DailyChairEntry>,
    cleaning: Vec<Chair>,
) -> Vec<DailyChairEntry> {
    for chair in cleaning {
        if occupied.iter().any(|e| e.chair_id == chair.chair_id) {
            continue;
        }
        occupied.push(DailyChairEntry {
            patient: DailyChairPatient {
                id: format!("cleaning-{}", chair.chair_id),
                name: "Cleaning".to_string(),
                priority: "cleaning".to_string(),
                code: None,
                alert: chair.notes,
            },
            chair_id: chair.chair_id,
        });
    }
    occupied
}

pub struct DailyChairsService {
    store: RecordStoreClient,
    cleaning: CleaningService,
    clinic_id: String,
}

impl DailyChairsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: RecordStoreClient::new(config),
            cleaning: CleaningService::new(config),
            clinic_id: config.clinic_id.clone(),
        }
    }

    /// The daily board: every occupied chair with its patient, plus cleaning
    /// chairs as placeholders. Pairings whose patient record has vanished
    /// are skipped rather than surfaced.
    pub async fn get_daily_chairs(
        &self,
        auth_token: &str,
    ) -> Result<Vec<DailyChairEntry>, SessionError> {
        let clinic: Option<Clinic> = self
            .store
            .select_first("clinics", &format!("id=eq.{}", self.clinic_id), Some(auth_token))
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        let occupants = clinic.map(|c| c.active_chairs).unwrap_or_default();
        debug!("Building daily board for {} occupied chairs", occupants.len());

        let lookups = occupants.iter().map(|o| async {
            let patient: Option<Patient> = self
                .store
                .select_first("patients", &format!("id=eq.{}", o.patient_id), Some(auth_token))
                .await
                .ok()
                .flatten();

            let patient = patient?;

            let user: Option<Value> = self
                .store
                .select_first("users", &format!("id=eq.{}", patient.user_id), Some(auth_token))
                .await
                .ok()
                .flatten();

            let name = user
                .as_ref()
                .and_then(|u| match (u["first_name"].as_str(), u["last_name"].as_str()) {
                    (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
                    _ => None,
                })
                .unwrap_or_else(|| "Unknown Patient".to_string());

            Some(DailyChairEntry {
                chair_id: o.chair_id.clone(),
                patient: DailyChairPatient {
                    id: patient.id.to_string(),
                    name,
                    priority: serde_json::to_value(patient.priority)
                        .ok()
                        .and_then(|v| v.as_str().map(|s| s.to_string()))
                        .unwrap_or_else(|| "stable".to_string()),
                    code: patient.code,
                    alert: patient.alert,
                },
            })
        });

        let occupied: Vec<DailyChairEntry> =
            join_all(lookups).await.into_iter().flatten().collect();

        let cleaning = self
            .cleaning
            .list_cleaning(auth_token)
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        Ok(merge_daily_chairs(occupied, cleaning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chair_cell::models::ChairStatus;
    use uuid::Uuid;

    fn occupied_entry(chair_id: &str) -> DailyChairEntry {
        DailyChairEntry {
            chair_id: chair_id.to_string(),
            patient: DailyChairPatient {
                id: Uuid::new_v4().to_string(),
                name: "Seated Patient".to_string(),
                priority: "stable".to_string(),
                code: None,
                alert: None,
            },
        }
    }

    fn cleaning_chair(chair_id: &str) -> Chair {
        Chair {
            id: Uuid::new_v4(),
            chair_id: chair_id.to_string(),
            status: ChairStatus::Cleaning,
            start_time: None,
            end_time: None,
            notes: None,
        }
    }

    #[test]
    fn test_cleaning_chairs_become_placeholders() {
        let board = merge_daily_chairs(vec![occupied_entry("1")], vec![cleaning_chair("2")]);

        assert_eq!(board.len(), 2);
        let placeholder = board.iter().find(|e| e.chair_id == "2").unwrap();
        assert_eq!(placeholder.patient.id, "cleaning-2");
        assert_eq!(placeholder.patient.priority, "cleaning");
    }

    #[test]
    fn test_occupied_chair_wins_over_cleaning_flag() {
        let board = merge_daily_chairs(vec![occupied_entry("1")], vec![cleaning_chair("1")]);

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].patient.name, "Seated Patient");
    }

    #[test]
    fn test_empty_board() {
        assert!(merge_daily_chairs(vec![], vec![]).is_empty());
    }
}
