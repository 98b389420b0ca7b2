pub mod types;
pub mod slot_utils;
pub mod conflict;
pub mod duration;
pub mod occupancy;
pub mod editor;
pub mod view;

pub use types::{Catalog, Day, DaySchedule, Slot, SlotEdit, SlotStatus, SlotView};
pub use slot_utils::{duration_to_slot_count, SlotGrid};
pub use conflict::{conflicting_rooms, has_teacher_conflict, slot_status};
pub use duration::is_duration_available;
pub use occupancy::{available_rooms, room_occupancy};
pub use editor::apply_edit;
pub use view::{day_view, slot_view};
