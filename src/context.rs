use std::collections::HashMap;

use log::{info, warn};

use crate::error::PlanningError;
use crate::schedule::{apply_edit, slot_view, Catalog, Day, DaySchedule, Slot, SlotEdit, SlotGrid, SlotView};
use crate::store::ScheduleStore;

/// Catalogs and cached day snapshots, passed explicitly to every handler
pub struct PlanningContext {
    catalog: Catalog,
    days: HashMap<Day, DaySchedule>,
    grid: SlotGrid,
}

impl PlanningContext {
    pub fn load(store: &dyn ScheduleStore, grid: SlotGrid) -> Result<Self, PlanningError> {
        Ok(PlanningContext {
            catalog: store.catalog()?,
            days: HashMap::new(),
            grid,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Cached snapshot of a day, fetched from the store on a miss
    pub fn day(&mut self, day: Day, store: &dyn ScheduleStore) -> Result<&DaySchedule, PlanningError> {
        if !self.days.contains_key(&day) {
            let schedule = store.day_schedule(day)?;
            self.days.insert(day, schedule);
        }
        self.days
            .get(&day)
            .ok_or_else(|| PlanningError::InvalidReference(format!("day {}", day)))
    }

    pub fn invalidate(&mut self, day: Day) {
        self.days.remove(&day);
    }

    /// Drops every cached day and re-reads the catalogs
    pub fn reload(&mut self, store: &dyn ScheduleStore) -> Result<(), PlanningError> {
        self.catalog = store.catalog()?;
        self.days.clear();
        info!(
            "Reloaded planning context: {} rooms, {} professors",
            self.catalog.rooms.len(),
            self.catalog.professors.len()
        );
        Ok(())
    }

    /// Professor and equipment in an edit must exist in the catalogs
    pub fn check_references(&self, edit: &SlotEdit) -> Result<(), PlanningError> {
        if let Some(professor) = edit.professor.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            if !self.catalog.professors.contains_key(professor) {
                return Err(PlanningError::InvalidReference(format!("professor {}", professor)));
            }
        }
        if let Some(equipment) = &edit.equipment {
            if let Some(unknown) = equipment.iter().find(|e| !self.catalog.equipment.contains_key(*e)) {
                return Err(PlanningError::InvalidReference(format!("equipment {}", unknown)));
            }
        }
        Ok(())
    }

    /// Runs every check of `apply` against a scratch copy of the day; nothing is persisted
    pub fn validate(
        &mut self,
        store: &dyn ScheduleStore,
        day: Day,
        room: &str,
        index: usize,
        edit: &SlotEdit,
    ) -> Result<(), PlanningError> {
        self.check_references(edit)?;
        let mut scratch = self.day(day, store)?.clone();
        apply_edit(day, &mut scratch, room, index, edit).map(|_| ())
    }

    /// Validates and applies an edit, persists every changed slot and returns their records
    pub fn apply(
        &mut self,
        store: &dyn ScheduleStore,
        day: Day,
        room: &str,
        index: usize,
        edit: &SlotEdit,
    ) -> Result<Vec<SlotView>, PlanningError> {
        self.check_references(edit)?;
        self.day(day, store)?;
        let schedule = self
            .days
            .get_mut(&day)
            .ok_or_else(|| PlanningError::InvalidReference(format!("day {}", day)))?;

        let changed = apply_edit(day, schedule, room, index, edit)?;

        let writes: Vec<(usize, Slot)> = changed
            .iter()
            .filter_map(|&i| schedule.slot(room, i).map(|slot| (i, slot.clone())))
            .collect();
        if let Err(e) = store.persist_slots(day, room, &writes) {
            warn!("Failed to persist {} on {}: {}", room, day, e);
            self.invalidate(day);
            return Err(e);
        }

        let schedule = &self.days[&day];
        Ok(changed
            .into_iter()
            .filter_map(|i| slot_view(schedule, &self.grid, room, i))
            .collect())
    }
}
