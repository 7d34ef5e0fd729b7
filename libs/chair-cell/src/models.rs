use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Physical treatment station. Records are created lazily the first time a
/// chair id is touched, so a chair with no record is simply available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chair {
    pub id: Uuid,
    pub chair_id: String,
    pub status: ChairStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChairStatus {
    Available,
    Cleaning,
    Occupied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCleaningRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStatusRequest {
    pub status: ChairStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum ChairError {
    #[error("Chair not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
