use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dialysis patient record, linked 1:1 to a user identity.
/// `block` is stored as a free string; queue derivation coerces unknown
/// labels into block 3 rather than rejecting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub present: bool,
    pub block: Option<String>,
    #[serde(default)]
    pub priority: PatientPriority,
    pub alert: Option<String>,
    pub code: Option<String>,
    pub dry_weight: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientPriority {
    #[default]
    Stable,
    Warning,
    Critical,
}

/// Patient record merged with its user identity, the shape staff-facing
/// views render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(flatten)]
    pub patient: Patient,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl PatientProfile {
    pub fn name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            _ => "Unknown Patient".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub user_id: Uuid,
    pub block: Option<String>,
    pub priority: Option<PatientPriority>,
    pub alert: Option<String>,
    pub code: Option<String>,
    pub dry_weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub block: Option<String>,
    pub priority: Option<PatientPriority>,
    pub alert: Option<String>,
    pub code: Option<String>,
    pub dry_weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPresenceRequest {
    pub present: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSearchQuery {
    pub name: Option<String>,
    pub code: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Patient already linked to user {user_id}")]
    AlreadyLinked { user_id: Uuid },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
