use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use patient_cell::models::PatientPriority;

/// Queue bucket. Waiting patients are partitioned into three blocks; any
/// label outside the recognized set is coerced into block 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

impl Block {
    pub fn coerce(label: &str) -> Block {
        match label {
            "1" => Block::One,
            "2" => Block::Two,
            _ => Block::Three,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Block::One => "1",
            Block::Two => "2",
            Block::Three => "3",
        }
    }
}

/// One clinical encounter or queue placement for a patient on a calendar
/// day. `date` is the canonical day key, computed once in UTC and matched by
/// equality. `present` tracks check-in independently of `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub status: MeetingStatus,
    pub chair_id: Option<String>,
    #[serde(default)]
    pub present: bool,
    pub weight: Option<f64>,
    pub condition: Option<String>,
    pub schedule: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingStatus {
    Scheduled,
    Active,
    InProgress,
    Completed,
    Cancelled,
    Pinned,
}

/// One (chair, patient) pairing in the clinic's occupancy cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairOccupant {
    pub chair_id: String,
    pub patient_id: Uuid,
}

/// Clinic record holding the denormalized occupancy cache. The canonical
/// clinic id is configuration, never "first record in the store".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub active_chairs: Vec<ChairOccupant>,
    #[serde(default)]
    pub occupancy_version: i64,
}

/// A waiting patient as rendered by the queue board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub patient_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub priority: PatientPriority,
    pub alert: Option<String>,
    pub block: Block,
    pub meeting_today: Option<Meeting>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockBuckets {
    #[serde(rename = "1")]
    pub one: Vec<QueueEntry>,
    #[serde(rename = "2")]
    pub two: Vec<QueueEntry>,
    #[serde(rename = "3")]
    pub three: Vec<QueueEntry>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BlockCounts {
    #[serde(rename = "1")]
    pub one: usize,
    #[serde(rename = "2")]
    pub two: usize,
    #[serde(rename = "3")]
    pub three: usize,
}

/// Fully partitioned queue. Callers choose between showing everything and
/// showing only the first non-empty block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueView {
    pub patients: Vec<QueueEntry>,
    pub by_block: BlockBuckets,
    pub counts: BlockCounts,
}

impl QueueView {
    pub fn bucket(&self, block: Block) -> &[QueueEntry] {
        match block {
            Block::One => &self.by_block.one,
            Block::Two => &self.by_block.two,
            Block::Three => &self.by_block.three,
        }
    }

    /// The "first non-empty block wins" policy: later blocks stay hidden
    /// until the chosen one empties.
    pub fn first_active_block(&self) -> Option<(Block, &[QueueEntry])> {
        [Block::One, Block::Two, Block::Three]
            .into_iter()
            .map(|b| (b, self.bucket(b)))
            .find(|(_, entries)| !entries.is_empty())
    }
}

/// A chair on the daily board: either an occupant or a cleaning placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyChairEntry {
    pub chair_id: String,
    pub patient: DailyChairPatient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyChairPatient {
    pub id: String,
    pub name: String,
    pub priority: String,
    pub code: Option<String>,
    pub alert: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignChairRequest {
    pub patient_id: Uuid,
    /// None unassigns the patient from whatever chair they hold.
    pub chair_id: Option<String>,
    /// Occupancy version the caller observed; only checked in strict mode.
    pub expected_version: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkPresentRequest {
    pub patient_id: Uuid,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DischargeRequest {
    pub chair_id: String,
    pub patient_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeetingRequest {
    pub patient_id: Uuid,
    pub date: Option<NaiveDate>,
    pub status: MeetingStatus,
    pub chair_id: Option<String>,
    pub weight: Option<f64>,
    pub condition: Option<String>,
    pub schedule: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Patient not found")]
    PatientNotFound,

    #[error("Stale occupancy version: expected {expected}, found {found}")]
    StaleVersion { expected: i64, found: i64 },

    #[error("Chair {chair_id} is occupied by another patient")]
    ChairOccupied { chair_id: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
