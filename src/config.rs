use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Json, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::PlanningError;
use crate::schedule::slot_utils::parse_time;
use crate::schedule::SlotGrid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub slots_per_day: usize,
    /// First slot start, "HH:MM"
    pub day_start: String,
    pub slot_minutes: u32,
    /// Idle delay before a queued edit is applied
    pub debounce_ms: u64,
    pub seed_csv: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            slots_per_day: 10,
            day_start: "08:00".to_string(),
            slot_minutes: 60,
            debounce_ms: 500,
            seed_csv: None,
        }
    }
}

impl Config {
    /// Defaults, then the JSON file if present, then `PLANNING_*` environment variables
    pub fn load(json_path: &Path) -> Result<Self, PlanningError> {
        Ok(Figment::from(Serialized::defaults(Config::default()))
            .merge(Json::file(json_path))
            .merge(Env::prefixed("PLANNING_"))
            .extract()?)
    }

    pub fn grid(&self) -> Result<SlotGrid, PlanningError> {
        let day_start = parse_time(&self.day_start)
            .ok_or_else(|| figment::Error::from(format!("invalid day_start '{}'", self.day_start)))?;
        Ok(SlotGrid {
            day_start,
            slot_minutes: self.slot_minutes,
            slots_per_day: self.slots_per_day,
        })
    }
}
