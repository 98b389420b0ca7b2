use super::conflict::status_at;
use super::slot_utils::SlotGrid;
use super::types::{DaySchedule, SlotView};

/// Builds the caller-facing record of one slot, status recomputed against the day
pub fn slot_view(day_schedule: &DaySchedule, grid: &SlotGrid, room: &str, index: usize) -> Option<SlotView> {
    let slot = day_schedule.slot(room, index)?;
    let status = status_at(day_schedule, room, index)?;
    Some(SlotView {
        room: room.to_string(),
        index,
        time: grid.slot_label(index),
        professor: slot.professor.clone(),
        subject: slot.subject.clone(),
        duration: slot.duration,
        equipment: slot.equipment.clone(),
        is_continuation: slot.is_continuation,
        status,
    })
}

/// Every slot of every room, rooms in id order
pub fn day_view(day_schedule: &DaySchedule, grid: &SlotGrid) -> Vec<SlotView> {
    day_schedule
        .rooms
        .iter()
        .flat_map(|(room, slots)| (0..slots.len()).map(move |index| (room, index)))
        .filter_map(|(room, index)| slot_view(day_schedule, grid, room, index))
        .collect()
}
