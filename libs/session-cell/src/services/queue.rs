use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use tracing::debug;

use patient_cell::models::Patient;
use shared_config::AppConfig;
use shared_database::record_store::RecordStoreClient;

use crate::models::{Block, Meeting, MeetingStatus, QueueEntry, QueueView, SessionError};

/// Safety bound on queue size. Collections are tens of records; the cap only
/// guards against a runaway store, it is not pagination.
pub const QUEUE_CAP: usize = 200;

/// A present patient joined with their display name and today's meeting,
/// ready for partitioning.
#[derive(Debug, Clone)]
pub struct QueueCandidate {
    pub patient: Patient,
    pub name: String,
    pub meeting_today: Option<Meeting>,
}

/// Partition the waiting room into block buckets.
///
/// A candidate is eligible when the patient is present, today's meeting (if
/// one exists) is still scheduled or active, no chair is held, and a block is
/// assigned. Unknown block labels fall back to block 3. Order within a
/// bucket is the order candidates arrived in, nothing stronger.
pub fn partition_queue(candidates: Vec<QueueCandidate>) -> QueueView {
    let mut view = QueueView::default();

    for candidate in candidates {
        if view.patients.len() >= QUEUE_CAP {
            break;
        }

        if !candidate.patient.present {
            continue;
        }

        if let Some(meeting) = &candidate.meeting_today {
            let waiting = matches!(meeting.status, MeetingStatus::Scheduled | MeetingStatus::Active);
            if !waiting || meeting.chair_id.is_some() {
                continue;
            }
        }

        let Some(block_label) = candidate.patient.block.as_deref() else {
            continue;
        };
        let block = Block::coerce(block_label);

        let entry = QueueEntry {
            patient_id: candidate.patient.id,
            user_id: candidate.patient.user_id,
            name: candidate.name,
            code: candidate.patient.code.clone(),
            priority: candidate.patient.priority,
            alert: candidate.patient.alert.clone(),
            block,
            meeting_today: candidate.meeting_today,
        };

        view.patients.push(entry.clone());
        match block {
            Block::One => view.by_block.one.push(entry),
            Block::Two => view.by_block.two.push(entry),
            Block::Three => view.by_block.three.push(entry),
        }
    }

    view.counts.one = view.by_block.one.len();
    view.counts.two = view.by_block.two.len();
    view.counts.three = view.by_block.three.len();

    view
}

pub struct QueueService {
    store: RecordStoreClient,
}

impl QueueService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: RecordStoreClient::new(config),
        }
    }

    /// Derive the queue from scratch: present patients plus today's meetings,
    /// joined per patient. Sub-queries are separate round trips, so the view
    /// is best-effort consistent within the call, never a snapshot.
    pub async fn get_queue(&self, auth_token: &str) -> Result<QueueView, SessionError> {
        let today = Utc::now().date_naive();
        debug!("Deriving queue for {}", today);

        let patients: Vec<Patient> = self
            .store
            .select(
                "patients",
                &format!("present=eq.true&limit={}", QUEUE_CAP),
                Some(auth_token),
            )
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        let meetings: Vec<Meeting> = self
            .store
            .select("meetings", &format!("date=eq.{}", today), Some(auth_token))
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        let lookups = patients.iter().map(|p| {
            let filter = format!("id=eq.{}", p.user_id);
            async move {
                self.store
                    .select_first::<Value>("users", &filter, Some(auth_token))
                    .await
            }
        });
        let users = join_all(lookups).await;

        let mut candidates = Vec::with_capacity(patients.len());
        for (patient, user) in patients.into_iter().zip(users) {
            let user = user.map_err(|e| SessionError::DatabaseError(e.to_string()))?;
            let name = user
                .as_ref()
                .and_then(|u| {
                    match (u["first_name"].as_str(), u["last_name"].as_str()) {
                        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
                        _ => None,
                    }
                })
                .unwrap_or_else(|| "Unknown Patient".to_string());

            let meeting_today = meetings
                .iter()
                .find(|m| m.patient_id == patient.id)
                .cloned();

            candidates.push(QueueCandidate {
                patient,
                name,
                meeting_today,
            });
        }

        Ok(partition_queue(candidates))
    }
}
