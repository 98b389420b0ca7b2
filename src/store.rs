use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use log::debug;

use crate::error::PlanningError;
use crate::schedule::{Catalog, Day, DaySchedule, Slot};

/// Persistence seen by the planning core: full-day reads and slot writes
pub trait ScheduleStore: Send + Sync {
    fn catalog(&self) -> Result<Catalog, PlanningError>;

    fn day_schedule(&self, day: Day) -> Result<DaySchedule, PlanningError>;

    fn persist_slot(&self, day: Day, room: &str, index: usize, slot: &Slot) -> Result<(), PlanningError>;

    /// Writes every slot of one edit, or none of them
    fn persist_slots(&self, day: Day, room: &str, slots: &[(usize, Slot)]) -> Result<(), PlanningError>;
}

/// In-memory storage for the week (in production, use a database)
pub struct MemoryStore {
    catalog: Mutex<Catalog>,
    days: Mutex<BTreeMap<Day, DaySchedule>>,
}

impl MemoryStore {
    /// Creates a store with empty slots for every room and day
    pub fn new(catalog: Catalog, slots_per_day: usize) -> Self {
        let days = Day::ALL
            .iter()
            .map(|&day| (day, DaySchedule::empty(catalog.room_ids(), slots_per_day)))
            .collect();
        MemoryStore {
            catalog: Mutex::new(catalog),
            days: Mutex::new(days),
        }
    }
}

// Recovers the guard from a poisoned lock
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScheduleStore for MemoryStore {
    fn catalog(&self) -> Result<Catalog, PlanningError> {
        Ok(lock(&self.catalog).clone())
    }

    fn day_schedule(&self, day: Day) -> Result<DaySchedule, PlanningError> {
        Ok(lock(&self.days).get(&day).cloned().unwrap_or_default())
    }

    fn persist_slot(&self, day: Day, room: &str, index: usize, slot: &Slot) -> Result<(), PlanningError> {
        self.persist_slots(day, room, &[(index, slot.clone())])
    }

    fn persist_slots(&self, day: Day, room: &str, slots: &[(usize, Slot)]) -> Result<(), PlanningError> {
        let mut days = lock(&self.days);
        let target = days
            .get_mut(&day)
            .and_then(|schedule| schedule.rooms.get_mut(room))
            .ok_or_else(|| PlanningError::InvalidReference(format!("room {} on {}", room, day)))?;
        if let Some((index, _)) = slots.iter().find(|(index, _)| *index >= target.len()) {
            return Err(PlanningError::InvalidReference(format!("slot {} of room {} on {}", index, room, day)));
        }

        for (index, slot) in slots {
            target[*index] = slot.clone();
        }
        debug!("Persisted {} slots of {} on {}", slots.len(), room, day);
        Ok(())
    }
}
