use uuid::Uuid;

use crate::models::ChairOccupant;

/// Result of planning an occupancy change. `occupants` is the full
/// replacement list; the clinic patch is skipped when nothing changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPlan {
    pub occupants: Vec<ChairOccupant>,
    /// Another patient displaced from the target chair. Permissive mode
    /// applies the plan anyway; strict mode refuses it.
    pub evicted: Option<ChairOccupant>,
    pub changed: bool,
}

/// Compute the occupancy list after moving `patient_id` to `chair_id`
/// (or out of any chair when `chair_id` is None).
///
/// The patient is first removed from whatever chair they hold, which makes
/// unassignment idempotent. When assigning, any other occupant of the target
/// chair is displaced, last writer wins.
pub fn plan_assignment(
    current: &[ChairOccupant],
    patient_id: Uuid,
    chair_id: Option<&str>,
) -> AssignmentPlan {
    let mut occupants: Vec<ChairOccupant> = current
        .iter()
        .filter(|o| o.patient_id != patient_id)
        .cloned()
        .collect();

    let mut evicted = None;

    if let Some(chair_id) = chair_id {
        if let Some(pos) = occupants.iter().position(|o| o.chair_id == chair_id) {
            evicted = Some(occupants.remove(pos));
        }
        occupants.push(ChairOccupant {
            chair_id: chair_id.to_string(),
            patient_id,
        });
    }

    let changed = occupants != current;

    AssignmentPlan {
        occupants,
        evicted,
        changed,
    }
}

/// Remove the exact (chair, patient) pairing. A pairing that is not present
/// leaves the list untouched.
pub fn plan_discharge(
    current: &[ChairOccupant],
    chair_id: &str,
    patient_id: Uuid,
) -> AssignmentPlan {
    let occupants: Vec<ChairOccupant> = current
        .iter()
        .filter(|o| !(o.chair_id == chair_id && o.patient_id == patient_id))
        .cloned()
        .collect();

    let changed = occupants != current;

    AssignmentPlan {
        occupants,
        evicted: None,
        changed,
    }
}
