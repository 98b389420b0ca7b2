use super::types::{DaySchedule, RoomId, Slot, SlotStatus};

/// Checks whether `professor` already teaches in another room at `slot_index`.
/// The room under edit is never inspected; an absent or empty professor never conflicts.
pub fn has_teacher_conflict(
    day_schedule: &DaySchedule,
    current_room: &str,
    slot_index: usize,
    professor: Option<&str>,
) -> bool {
    let Some(professor) = professor.filter(|p| !p.is_empty()) else {
        return false;
    };

    day_schedule
        .rooms
        .iter()
        .filter(|(room, _)| room.as_str() != current_room)
        .any(|(_, slots)| {
            slots
                .get(slot_index)
                .and_then(Slot::professor_id)
                .is_some_and(|assigned| assigned == professor)
        })
}

/// Lists the other rooms where `professor` is placed at `slot_index`
pub fn conflicting_rooms(
    day_schedule: &DaySchedule,
    current_room: &str,
    slot_index: usize,
    professor: Option<&str>,
) -> Vec<RoomId> {
    let Some(professor) = professor.filter(|p| !p.is_empty()) else {
        return Vec::new();
    };

    day_schedule
        .rooms
        .iter()
        .filter(|(room, _)| room.as_str() != current_room)
        .filter(|(_, slots)| {
            slots
                .get(slot_index)
                .and_then(Slot::professor_id)
                .is_some_and(|assigned| assigned == professor)
        })
        .map(|(room, _)| room.clone())
        .collect()
}

/// Derives the three-state status of a slot from its assignment and the conflict check
pub fn slot_status(slot: &Slot, conflict: bool) -> SlotStatus {
    match (slot.professor_id(), conflict) {
        (None, _) => SlotStatus::Available,
        (Some(_), false) => SlotStatus::Occupied,
        (Some(_), true) => SlotStatus::Conflict,
    }
}

/// Status of the slot at (room, index), running the conflict check against the rest of the day
pub fn status_at(day_schedule: &DaySchedule, room: &str, slot_index: usize) -> Option<SlotStatus> {
    let slot = day_schedule.slot(room, slot_index)?;
    let conflict = has_teacher_conflict(day_schedule, room, slot_index, slot.professor_id());
    Some(slot_status(slot, conflict))
}
