use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use serde::Deserialize;

use crate::context::PlanningContext;
use crate::error::PlanningError;
use crate::schedule::types::{Equipment, Professor, Room};
use crate::schedule::{Catalog, Day, SlotEdit};
use crate::store::ScheduleStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Professor,
    Room,
    Equipment,
    Assignment,
}

/// One line of a planning CSV: catalog entries and slot assignments share a layout
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportRow {
    pub kind: RowKind,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub slot: Option<usize>,
    #[serde(default)]
    pub professor: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub duration: Option<f64>,
    /// `;`-separated equipment ids
    #[serde(default)]
    pub equipment: String,
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportReport {
    pub applied: usize,
    pub rejected: Vec<String>,
}

pub fn read_rows<R: Read>(reader: R) -> Result<Vec<ImportRow>, PlanningError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).flexible(true).from_reader(reader);
    let mut rows: Vec<ImportRow> = Vec::new();
    for result in reader.deserialize::<ImportRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn load_rows<P: AsRef<Path>>(csv_path: P) -> Result<Vec<ImportRow>, PlanningError> {
    let file = std::fs::File::open(csv_path)?;
    read_rows(file)
}

/// Builds the catalogs from professor, room and equipment rows.
/// A repeated id replaces the earlier entry.
pub fn build_catalog(rows: &[ImportRow]) -> Catalog {
    let mut catalog = Catalog::default();
    for row in rows.iter().filter(|r| !r.id.is_empty()) {
        let name = if row.name.is_empty() { row.id.clone() } else { row.name.clone() };
        match row.kind {
            RowKind::Professor => {
                catalog.professors.insert(row.id.clone(), Professor { id: row.id.clone(), name });
            }
            RowKind::Equipment => {
                catalog.equipment.insert(row.id.clone(), Equipment { id: row.id.clone(), name });
            }
            RowKind::Room => {
                let room = Room {
                    id: row.id.clone(),
                    name,
                    capacity: row.capacity,
                };
                match catalog.rooms.iter_mut().find(|r| r.id == row.id) {
                    Some(existing) => *existing = room,
                    None => catalog.rooms.push(room),
                }
            }
            RowKind::Assignment => {}
        }
    }
    catalog
}

fn assignment(row: &ImportRow) -> Result<(Day, usize, SlotEdit), PlanningError> {
    let day: Day = row.day.parse()?;
    let index = row
        .slot
        .ok_or_else(|| PlanningError::InvalidReference(format!("missing slot for room {}", row.room)))?;
    let equipment: BTreeSet<String> = row
        .equipment
        .split(';')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect();
    let edit = SlotEdit {
        professor: Some(row.professor.clone()),
        subject: Some(row.subject.clone()),
        equipment: Some(equipment),
        duration: row.duration,
        clear: false,
    };
    Ok((day, index, edit))
}

/// Runs every assignment row through the slot editor; rejected rows are reported and skipped
pub fn apply_assignments(
    context: &mut PlanningContext,
    store: &dyn ScheduleStore,
    rows: &[ImportRow],
) -> ImportReport {
    let mut report = ImportReport::default();
    for (line, row) in rows.iter().enumerate().filter(|(_, r)| r.kind == RowKind::Assignment) {
        let outcome = assignment(row).and_then(|(day, index, edit)| context.apply(store, day, &row.room, index, &edit));
        match outcome {
            Ok(_) => report.applied += 1,
            Err(e) => {
                warn!("Skipping assignment on row {}: {}", line + 1, e);
                report.rejected.push(format!("row {}: {}", line + 1, e));
            }
        }
    }
    info!("Imported {} assignments ({} rejected)", report.applied, report.rejected.len());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::SlotGrid;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const PLANNING: &str = "\
kind,id,name,capacity,day,room,slot,professor,subject,duration,equipment
room,A1,Amphi A1,120,,,,,,,
room,A2,Salle A2,30,,,,,,,
professor,P1,Mme Durand,,,,,,,,
professor,P2,M. Martin,,,,,,,,
equipment,VP,Vidéoprojecteur,,,,,,,,
assignment,,,,lundi,A1,2,P1,Chimie organique,2,VP
assignment,,,,lundi,A1,5,P2,Physique,,
assignment,,,,Lundi,A1,4,P2,Physique,2,
assignment,,,,dimanche,A2,0,P1,Chimie,,
";

    #[test]
    fn builds_catalog_from_rows() {
        let rows = read_rows(PLANNING.as_bytes()).unwrap();
        let catalog = build_catalog(&rows);
        assert_eq!(catalog.rooms.len(), 2);
        assert_eq!(catalog.rooms[0].capacity, Some(120));
        assert_eq!(catalog.professors["P2"].name, "M. Martin");
        assert!(catalog.equipment.contains_key("VP"));
    }

    #[test]
    fn later_room_rows_replace_earlier_ones() {
        let csv = "kind,id,name\nroom,A1,Old\nroom,B1,B\nroom,A1,New\n";
        let catalog = build_catalog(&read_rows(csv.as_bytes()).unwrap());
        let names: Vec<&str> = catalog.rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["New", "B"]);
    }

    #[test]
    fn applies_assignments_and_reports_rejections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLANNING.as_bytes()).unwrap();

        let rows = load_rows(file.path()).unwrap();
        let store = MemoryStore::new(build_catalog(&rows), 6);
        let mut context = PlanningContext::load(&store, SlotGrid::default()).unwrap();

        let report = apply_assignments(&mut context, &store, &rows);

        assert_eq!(report.applied, 2);
        assert_eq!(report.rejected.len(), 2);
        assert!(report.rejected[0].starts_with("row 8:"));
        assert!(report.rejected[1].contains("Unknown day"));

        let lundi = store.day_schedule(Day::Lundi).unwrap();
        assert_eq!(lundi.slot("A1", 2).unwrap().subject.as_deref(), Some("Chimie organique"));
        assert!(lundi.slot("A1", 3).unwrap().is_continuation);
        assert_eq!(lundi.slot("A1", 5).unwrap().professor.as_deref(), Some("P2"));
        assert!(lundi.slot("A1", 4).unwrap().is_free());
    }
}
