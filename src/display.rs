use crate::schedule::{day_view, Catalog, Day, DaySchedule, SlotGrid, SlotStatus, SlotView};

/// Formats a professor with the subject taught, falling back to the raw id
pub fn format_assignment(catalog: &Catalog, professor: &str, subject: Option<&str>) -> String {
    let name = catalog
        .professors
        .get(professor)
        .map(|p| p.name.as_str())
        .unwrap_or(professor);
    match subject {
        Some(subject) if !subject.is_empty() => format!("{} ({})", name, subject),
        _ => name.to_string(),
    }
}

/// One grid line: "HH:MM-HH:MM name (subject)" with a `!` marker on conflicts
pub fn format_slot_line(catalog: &Catalog, view: &SlotView) -> String {
    if view.is_continuation {
        return format!("{} [CONTINUATION]", view.time);
    }
    match view.professor.as_deref().filter(|p| !p.is_empty()) {
        Some(professor) => {
            let marker = if view.status == SlotStatus::Conflict { " !" } else { "" };
            format!(
                "{} {}{}",
                view.time,
                format_assignment(catalog, professor, view.subject.as_deref()),
                marker
            )
        }
        None => format!("{} [EMPTY]", view.time),
    }
}

/// Prints a day schedule in a readable format
pub fn print_day_schedule(day: Day, schedule: &DaySchedule, grid: &SlotGrid, catalog: &Catalog) {
    let views = day_view(schedule, grid);
    let conflicts = views.iter().filter(|v| v.status == SlotStatus::Conflict).count();

    println!("\n=== {} ===", day);
    if conflicts > 0 {
        println!("Conflicting slots: {}", conflicts);
    }

    let mut current_room: Option<&str> = None;
    for view in &views {
        if current_room != Some(view.room.as_str()) {
            let room_name = catalog
                .rooms
                .iter()
                .find(|r| r.id == view.room)
                .map(|r| r.name.as_str())
                .unwrap_or(view.room.as_str());
            println!("\n{}:", room_name);
            current_room = Some(view.room.as_str());
        }
        println!("  {}", format_slot_line(catalog, view));
    }
}
