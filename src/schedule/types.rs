use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::error::PlanningError;

pub type RoomId = String;
pub type ProfessorId = String;
pub type EquipmentId = String;

/// Weekday label, the unit of schedule partitioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Lundi,
    Mardi,
    Mercredi,
    Jeudi,
    Vendredi,
}

impl Day {
    pub const ALL: [Day; 5] = [Day::Lundi, Day::Mardi, Day::Mercredi, Day::Jeudi, Day::Vendredi];

    pub fn label(&self) -> &'static str {
        match self {
            Day::Lundi => "lundi",
            Day::Mardi => "mardi",
            Day::Mercredi => "mercredi",
            Day::Jeudi => "jeudi",
            Day::Vendredi => "vendredi",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Day {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Day::ALL
            .iter()
            .copied()
            .find(|d| d.label() == lower)
            .ok_or_else(|| PlanningError::UnknownDay(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professor {
    pub id: ProfessorId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: String,
}

/// One fixed time unit of a room's day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub professor: Option<ProfessorId>,
    pub subject: Option<String>,
    /// Requested length in slot units, stored on the start slot only
    pub duration: Option<f64>,
    #[serde(default)]
    pub equipment: BTreeSet<EquipmentId>,
    /// Consumed by the previous slot's multi-slot duration
    #[serde(default)]
    pub is_continuation: bool,
}

impl Slot {
    /// Professor id, ignoring the empty string
    pub fn professor_id(&self) -> Option<&str> {
        self.professor.as_deref().filter(|p| !p.is_empty())
    }

    pub fn is_free(&self) -> bool {
        self.professor_id().is_none() && !self.is_continuation
    }

    pub fn clear(&mut self) {
        *self = Slot::default();
    }

    pub fn mark_continuation(&mut self) {
        *self = Slot {
            is_continuation: true,
            ..Slot::default()
        };
    }
}

/// Schedule for a single day: room -> ordered slots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub rooms: BTreeMap<RoomId, Vec<Slot>>,
}

impl DaySchedule {
    /// Creates empty slots for every room
    pub fn empty<'a>(room_ids: impl IntoIterator<Item = &'a RoomId>, slots_per_day: usize) -> Self {
        DaySchedule {
            rooms: room_ids
                .into_iter()
                .map(|id| (id.clone(), vec![Slot::default(); slots_per_day]))
                .collect(),
        }
    }

    pub fn slot(&self, room: &str, index: usize) -> Option<&Slot> {
        self.rooms.get(room).and_then(|slots| slots.get(index))
    }
}

/// Derived visual state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Occupied,
    Conflict,
}

/// Slot record returned to callers, status included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    pub room: RoomId,
    pub index: usize,
    pub time: String,
    pub professor: Option<ProfessorId>,
    pub subject: Option<String>,
    pub duration: Option<f64>,
    pub equipment: BTreeSet<EquipmentId>,
    /// Taken by the booking before it. Such a slot has no professor, so its
    /// `status` reads `Available`; free-room searches still treat it as taken.
    pub is_continuation: bool,
    pub status: SlotStatus,
}

/// Partial update of a slot's fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotEdit {
    /// Empty string unassigns
    #[serde(default)]
    pub professor: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub equipment: Option<BTreeSet<EquipmentId>>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub clear: bool,
}

impl SlotEdit {
    /// Later fields override earlier ones; a clear discards what came before it
    pub fn merge(&mut self, later: SlotEdit) {
        if later.clear {
            *self = later;
            return;
        }
        if later.professor.is_some() {
            self.professor = later.professor;
        }
        if later.subject.is_some() {
            self.subject = later.subject;
        }
        if later.equipment.is_some() {
            self.equipment = later.equipment;
        }
        if later.duration.is_some() {
            self.duration = later.duration;
        }
    }
}

/// Room, professor and equipment catalogs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub rooms: Vec<Room>,
    pub professors: BTreeMap<ProfessorId, Professor>,
    pub equipment: BTreeMap<EquipmentId, Equipment>,
}

impl Catalog {
    pub fn room_ids(&self) -> impl Iterator<Item = &RoomId> {
        self.rooms.iter().map(|r| &r.id)
    }
}
