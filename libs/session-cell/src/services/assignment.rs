use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use chair_cell::services::CleaningService;
use patient_cell::models::Patient;
use shared_config::AppConfig;
use shared_database::record_store::RecordStoreClient;

use crate::models::{Clinic, Meeting, MeetingStatus, SessionError};
use crate::services::reconcile::{plan_assignment, plan_discharge, AssignmentPlan};

const DISCHARGE_NOTE: &str = "Post-session cleaning";
const SESSION_TITLE: &str = "Hemodialysis Session";

/// Applies occupancy plans against the record store. Each patch is atomic on
/// its own document; nothing here spans documents transactionally, so the
/// clinic pairing, the meeting, and the chair can briefly disagree.
pub struct AssignmentService {
    store: RecordStoreClient,
    cleaning: CleaningService,
    clinic_id: String,
    strict: bool,
}

impl AssignmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: RecordStoreClient::new(config),
            cleaning: CleaningService::new(config),
            clinic_id: config.clinic_id.clone(),
            strict: config.strict_assignment,
        }
    }

    async fn load_or_create_clinic(&self, auth_token: &str) -> Result<Clinic, SessionError> {
        let existing: Option<Clinic> = self
            .store
            .select_first("clinics", &format!("id=eq.{}", self.clinic_id), Some(auth_token))
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        if let Some(clinic) = existing {
            return Ok(clinic);
        }

        info!("Creating clinic record {}", self.clinic_id);
        self.store
            .insert(
                "clinics",
                json!({
                    "id": self.clinic_id,
                    "name": "Default Clinic",
                    "active_chairs": [],
                    "occupancy_version": 0,
                }),
                Some(auth_token),
            )
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))
    }

    async fn apply_plan(
        &self,
        clinic: &Clinic,
        plan: &AssignmentPlan,
        auth_token: &str,
    ) -> Result<i64, SessionError> {
        if !plan.changed {
            return Ok(clinic.occupancy_version);
        }

        let next_version = clinic.occupancy_version + 1;
        self.store
            .patch::<Clinic>(
                "clinics",
                &format!("id=eq.{}", clinic.id),
                json!({
                    "active_chairs": plan.occupants,
                    "occupancy_version": next_version,
                }),
                Some(auth_token),
            )
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        Ok(next_version)
    }

    async fn todays_meeting(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<Meeting>, SessionError> {
        let today = Utc::now().date_naive();
        self.store
            .select_first(
                "meetings",
                &format!("patient_id=eq.{}&date=eq.{}", patient_id, today),
                Some(auth_token),
            )
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))
    }

    /// Move a patient into a chair, or out of any chair when `chair_id` is
    /// None. The chair id is not validated against chair records; assigning
    /// to an id the clinic has never seen is accepted.
    pub async fn assign_chair(
        &self,
        patient_id: Uuid,
        chair_id: Option<String>,
        expected_version: Option<i64>,
        auth_token: &str,
    ) -> Result<Clinic, SessionError> {
        debug!("Assigning patient {} to chair {:?}", patient_id, chair_id);

        let clinic = self.load_or_create_clinic(auth_token).await?;

        if self.strict {
            if let Some(expected) = expected_version {
                if expected != clinic.occupancy_version {
                    return Err(SessionError::StaleVersion {
                        expected,
                        found: clinic.occupancy_version,
                    });
                }
            }
        }

        let plan = plan_assignment(&clinic.active_chairs, patient_id, chair_id.as_deref());

        if let Some(evicted) = &plan.evicted {
            if self.strict {
                return Err(SessionError::ChairOccupied {
                    chair_id: evicted.chair_id.clone(),
                });
            }
            // Last writer wins; the displaced pairing vanishes silently.
            warn!(
                "Patient {} displaced from chair {} by {}",
                evicted.patient_id, evicted.chair_id, patient_id
            );
        }

        let version = self.apply_plan(&clinic, &plan, auth_token).await?;

        // Keep the day's meeting in step with the pairing.
        match self.todays_meeting(patient_id, auth_token).await? {
            Some(meeting) => {
                self.store
                    .patch::<Meeting>(
                        "meetings",
                        &format!("id=eq.{}", meeting.id),
                        json!({ "chair_id": chair_id }),
                        Some(auth_token),
                    )
                    .await
                    .map_err(|e| SessionError::DatabaseError(e.to_string()))?;
            }
            None if chair_id.is_some() => {
                self.store
                    .insert::<Meeting>(
                        "meetings",
                        json!({
                            "patient_id": patient_id,
                            "date": Utc::now().date_naive(),
                            "status": MeetingStatus::InProgress,
                            "title": SESSION_TITLE,
                            "chair_id": chair_id,
                            "present": true,
                        }),
                        Some(auth_token),
                    )
                    .await
                    .map_err(|e| SessionError::DatabaseError(e.to_string()))?;
            }
            // Unassigning with no meeting on record: nothing to clear.
            None => {}
        }

        Ok(Clinic {
            active_chairs: plan.occupants,
            occupancy_version: version,
            ..clinic
        })
    }

    /// End the session in a chair: clear the pairing, complete today's
    /// meeting, and send the chair to cleaning.
    pub async fn discharge_patient(
        &self,
        chair_id: &str,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Clinic, SessionError> {
        debug!("Discharging patient {} from chair {}", patient_id, chair_id);

        let clinic = self.load_or_create_clinic(auth_token).await?;
        let plan = plan_discharge(&clinic.active_chairs, chair_id, patient_id);
        let version = self.apply_plan(&clinic, &plan, auth_token).await?;

        if let Some(meeting) = self.todays_meeting(patient_id, auth_token).await? {
            self.store
                .patch::<Meeting>(
                    "meetings",
                    &format!("id=eq.{}", meeting.id),
                    json!({
                        "status": MeetingStatus::Completed,
                        "chair_id": null,
                    }),
                    Some(auth_token),
                )
                .await
                .map_err(|e| SessionError::DatabaseError(e.to_string()))?;
        }

        self.cleaning
            .start_cleaning(chair_id, Some(DISCHARGE_NOTE.to_string()), auth_token)
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        Ok(Clinic {
            active_chairs: plan.occupants,
            occupancy_version: version,
            ..clinic
        })
    }

    /// Check a patient in or out for the day. The patient flag and the day's
    /// meeting both carry `present`; meeting status is left alone.
    pub async fn mark_present(
        &self,
        patient_id: Uuid,
        present: bool,
        auth_token: &str,
    ) -> Result<(), SessionError> {
        debug!("Marking patient {} present={}", patient_id, present);

        let patched: Vec<Patient> = self
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
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        if patched.is_empty() {
            return Err(SessionError::PatientNotFound);
        }

        match self.todays_meeting(patient_id, auth_token).await? {
            Some(meeting) => {
                self.store
                    .patch::<Meeting>(
                        "meetings",
                        &format!("id=eq.{}", meeting.id),
                        json!({ "present": present }),
                        Some(auth_token),
                    )
                    .await
                    .map_err(|e| SessionError::DatabaseError(e.to_string()))?;
            }
            None if present => {
                self.store
                    .insert::<Meeting>(
                        "meetings",
                        json!({
                            "patient_id": patient_id,
                            "date": Utc::now().date_naive(),
                            "status": MeetingStatus::Scheduled,
                            "title": SESSION_TITLE,
                            "present": true,
                        }),
                        Some(auth_token),
                    )
                    .await
                    .map_err(|e| SessionError::DatabaseError(e.to_string()))?;
            }
            // Checked out with no meeting for the day: nothing to record.
            None => {}
        }

        Ok(())
    }
}
