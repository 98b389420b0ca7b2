use std::collections::BTreeSet;

use crate::error::PlanningError;
use super::duration::{is_duration_available, mark_continuations, release_continuations};
use super::slot_utils::duration_to_slot_count;
use super::types::{Day, DaySchedule, SlotEdit};

/// Applies a partial edit to the slot at (room, index).
///
/// The edit is computed on a copy of the room's slots and committed only when every
/// check passes, so a rejected duration leaves the schedule untouched. A `clear` is
/// applied before the other fields of the same edit. Continuation slots belong to the
/// booking before them and are only changed through that booking's duration. Returns the
/// indices of every slot that changed, the edited slot first.
pub fn apply_edit(
    day: Day,
    day_schedule: &mut DaySchedule,
    room: &str,
    index: usize,
    edit: &SlotEdit,
) -> Result<Vec<usize>, PlanningError> {
    let current = day_schedule
        .rooms
        .get(room)
        .ok_or_else(|| PlanningError::InvalidReference(format!("room {}", room)))?;
    let slot = current
        .get(index)
        .ok_or_else(|| PlanningError::InvalidReference(format!("slot {} of room {}", index, room)))?;

    if slot.is_continuation {
        return Err(PlanningError::ContinuationSlot {
            room: room.to_string(),
            index,
        });
    }

    let mut slots = current.clone();
    let mut changed = BTreeSet::new();

    if edit.clear {
        changed.extend(release_continuations(&mut slots, index));
        slots[index].clear();
    }

    if let Some(professor) = &edit.professor {
        slots[index].professor = non_empty(professor);
    }
    if let Some(subject) = &edit.subject {
        slots[index].subject = non_empty(subject);
    }
    if let Some(equipment) = &edit.equipment {
        slots[index].equipment = equipment.clone();
    }

    if let Some(duration) = edit.duration {
        let count = duration_to_slot_count(duration).ok_or(PlanningError::InvalidDuration(duration))?;
        if count > 1 && !is_duration_available(day_schedule, room, index, duration) {
            return Err(PlanningError::DurationUnavailable {
                day,
                room: room.to_string(),
                index,
                duration,
            });
        }
        changed.extend(release_continuations(&mut slots, index));
        slots[index].duration = (duration > 0.0).then_some(duration);
        changed.extend(mark_continuations(&mut slots, index, count));
    }

    changed.remove(&index);
    day_schedule.rooms.insert(room.to_string(), slots);

    let mut indices = vec![index];
    indices.extend(changed);
    Ok(indices)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
