use super::slot_utils::duration_to_slot_count;
use super::types::{DaySchedule, Slot};

/// Checks whether the slots following `start_index` can be absorbed by a booking of `duration`.
/// A following slot blocks when it is out of range or holds an independent professor;
/// continuation slots of another booking can be taken over.
pub fn is_duration_available(
    day_schedule: &DaySchedule,
    room: &str,
    start_index: usize,
    duration: f64,
) -> bool {
    let Some(slots) = day_schedule.rooms.get(room) else {
        return false;
    };
    let Some(count) = duration_to_slot_count(duration) else {
        return false;
    };

    (1..count).all(|offset| match start_index.checked_add(offset).and_then(|i| slots.get(i)) {
        None => false,
        Some(slot) => slot.professor_id().is_none() || slot.is_continuation,
    })
}

/// Number of continuation slots directly following `start_index`
pub fn continuation_run(slots: &[Slot], start_index: usize) -> usize {
    slots
        .iter()
        .skip(start_index.saturating_add(1))
        .take_while(|slot| slot.is_continuation)
        .count()
}

/// Clears the continuation slots owned by the slot at `start_index`, returning their indices
pub fn release_continuations(slots: &mut [Slot], start_index: usize) -> Vec<usize> {
    let run = continuation_run(slots, start_index);
    let released: Vec<usize> = (start_index + 1..start_index + 1 + run).collect();
    for &index in &released {
        slots[index].clear();
    }
    released
}

/// Marks the `count - 1` slots after `start_index` as continuations and returns every index
/// that changed. An absorbed slot that owned a run of its own gives that run up first.
/// Callers check `is_duration_available` first.
pub fn mark_continuations(slots: &mut [Slot], start_index: usize, count: usize) -> Vec<usize> {
    let end = start_index.saturating_add(count).min(slots.len());
    let mut changed = Vec::new();
    for index in start_index + 1..end {
        if !slots[index].is_continuation {
            changed.extend(release_continuations(slots, index));
        }
        slots[index].mark_continuation();
        changed.push(index);
    }
    changed.sort_unstable();
    changed.dedup();
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::RoomId;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn taught_by(professor: &str) -> Slot {
        Slot {
            professor: Some(professor.to_string()),
            ..Slot::default()
        }
    }

    fn continuation() -> Slot {
        Slot {
            is_continuation: true,
            ..Slot::default()
        }
    }

    /// "A1" has six slots; slot 5 is taught by P2
    #[fixture]
    fn lundi() -> DaySchedule {
        let ids: Vec<RoomId> = vec!["A1".into()];
        let mut day = DaySchedule::empty(&ids, 6);
        day.rooms.get_mut("A1").unwrap()[5] = taught_by("P2");
        day
    }

    #[rstest]
    fn two_slots_check_only_the_next_one(lundi: DaySchedule) {
        assert!(is_duration_available(&lundi, "A1", 3, 2.0));
    }

    #[rstest]
    fn three_slots_are_blocked_by_an_independent_booking(lundi: DaySchedule) {
        assert!(!is_duration_available(&lundi, "A1", 3, 3.0));
    }

    #[rstest]
    fn one_and_a_half_checks_exactly_one_following_slot(mut lundi: DaySchedule) {
        assert!(is_duration_available(&lundi, "A1", 3, 1.5));
        assert!(!is_duration_available(&lundi, "A1", 4, 1.5));
        lundi.rooms.get_mut("A1").unwrap()[4] = taught_by("P3");
        assert!(!is_duration_available(&lundi, "A1", 3, 1.5));
    }

    #[rstest]
    fn single_slot_is_always_available(mut lundi: DaySchedule) {
        let slots = lundi.rooms.get_mut("A1").unwrap();
        for slot in slots.iter_mut() {
            *slot = taught_by("P9");
        }
        assert!(is_duration_available(&lundi, "A1", 0, 1.0));
        assert!(is_duration_available(&lundi, "A1", 5, 1.0));
    }

    #[rstest]
    #[case(5, 2.0)]
    #[case(4, 3.0)]
    #[case(3, 4.0)]
    #[case(0, 7.0)]
    fn running_past_the_end_is_unavailable(#[case] start: usize, #[case] duration: f64) {
        let ids: Vec<RoomId> = vec!["A1".into()];
        let day = DaySchedule::empty(&ids, 6);
        assert!(!is_duration_available(&day, "A1", start, duration));
    }

    #[rstest]
    fn continuation_slots_can_be_absorbed(mut lundi: DaySchedule) {
        lundi.rooms.get_mut("A1").unwrap()[5] = continuation();
        assert!(is_duration_available(&lundi, "A1", 3, 3.0));
    }

    #[rstest]
    fn unknown_room_is_unavailable(lundi: DaySchedule) {
        assert!(!is_duration_available(&lundi, "Z9", 0, 1.0));
    }

    #[rstest]
    fn invalid_durations_are_unavailable(lundi: DaySchedule) {
        assert!(!is_duration_available(&lundi, "A1", 0, -2.0));
        assert!(!is_duration_available(&lundi, "A1", 0, f64::INFINITY));
    }

    #[test]
    fn marks_and_releases_a_run() {
        let mut slots = vec![Slot::default(); 6];
        slots[1] = taught_by("P1");
        assert_eq!(mark_continuations(&mut slots, 1, 3), vec![2, 3]);
        assert!(slots[2].is_continuation && slots[3].is_continuation);
        assert!(!slots[4].is_continuation);
        assert_eq!(continuation_run(&slots, 1), 2);

        assert_eq!(release_continuations(&mut slots, 1), vec![2, 3]);
        assert_eq!(continuation_run(&slots, 1), 0);
        assert_eq!(slots[2], Slot::default());
    }

    #[test]
    fn absorbing_a_slot_releases_the_run_it_owned() {
        let mut slots = vec![Slot::default(); 8];
        slots[3] = Slot {
            subject: Some("TD".into()),
            duration: Some(3.0),
            ..Slot::default()
        };
        mark_continuations(&mut slots, 3, 3);

        assert_eq!(mark_continuations(&mut slots, 1, 3), vec![2, 3, 4, 5]);
        assert_eq!(continuation_run(&slots, 1), 2);
        assert!(slots[3].is_continuation);
        assert_eq!(slots[4], Slot::default());
        assert_eq!(slots[5], Slot::default());
    }
}
