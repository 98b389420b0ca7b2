use serde::{Deserialize, Serialize};

use super::duration::continuation_run;
use super::types::{DaySchedule, ProfessorId, RoomId};

/// An occupied span of a room, starting at an independently assigned slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupiedSpan {
    pub index: usize,
    pub span: usize,
    pub professor: Option<ProfessorId>,
    pub subject: Option<String>,
}

/// Rooms whose slots `[start, start + count)` all exist and are free
pub fn available_rooms(day_schedule: &DaySchedule, start: usize, count: usize) -> Vec<RoomId> {
    let count = count.max(1);
    day_schedule
        .rooms
        .iter()
        .filter(|(_, slots)| match start.checked_add(count) {
            Some(end) if end <= slots.len() => slots[start..end].iter().all(|s| s.is_free()),
            _ => false,
        })
        .map(|(room, _)| room.clone())
        .collect()
}

/// Occupied spans of a room for the day, sorted by start index
pub fn room_occupancy(day_schedule: &DaySchedule, room: &str) -> Vec<OccupiedSpan> {
    let Some(slots) = day_schedule.rooms.get(room) else {
        return Vec::new();
    };

    slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| !slot.is_continuation && slot.professor_id().is_some())
        .map(|(index, slot)| OccupiedSpan {
            index,
            span: 1 + continuation_run(slots, index),
            professor: slot.professor.clone(),
            subject: slot.subject.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::Slot;
    use pretty_assertions::assert_eq;

    fn day() -> DaySchedule {
        let ids: Vec<RoomId> = vec!["A1".into(), "A2".into(), "B1".into()];
        let mut day = DaySchedule::empty(&ids, 4);
        let a1 = day.rooms.get_mut("A1").unwrap();
        a1[1] = Slot {
            professor: Some("P1".into()),
            subject: Some("Biologie".into()),
            duration: Some(2.0),
            ..Slot::default()
        };
        a1[2].mark_continuation();
        day.rooms.get_mut("B1").unwrap()[3] = Slot {
            professor: Some("P2".into()),
            ..Slot::default()
        };
        day
    }

    #[test]
    fn free_rooms_exclude_bookings_and_continuations() {
        let day = day();
        assert_eq!(available_rooms(&day, 1, 1), vec!["A2".to_string(), "B1".to_string()]);
        assert_eq!(available_rooms(&day, 2, 2), vec!["A2".to_string()]);
        assert_eq!(available_rooms(&day, 3, 2), Vec::<RoomId>::new());
        assert_eq!(available_rooms(&day, 0, 1).len(), 3);
    }

    #[test]
    fn huge_spans_find_no_room() {
        let day = day();
        assert!(available_rooms(&day, usize::MAX, 2).is_empty());
        assert!(available_rooms(&day, 1, usize::MAX).is_empty());
        assert!(available_rooms(&day, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn occupancy_reports_spans() {
        let day = day();
        assert_eq!(
            room_occupancy(&day, "A1"),
            vec![OccupiedSpan {
                index: 1,
                span: 2,
                professor: Some("P1".into()),
                subject: Some("Biologie".into()),
            }]
        );
        assert_eq!(room_occupancy(&day, "B1")[0].span, 1);
        assert!(room_occupancy(&day, "A2").is_empty());
        assert!(room_occupancy(&day, "nowhere").is_empty());
    }
}
