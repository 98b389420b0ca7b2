use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::commands::{spawn_dispatcher, SlotCommand, SlotKey};
use crate::context::PlanningContext;
use crate::error::PlanningError;
use crate::schedule::occupancy::OccupiedSpan;
use crate::schedule::types::RoomId;
use crate::schedule::{
    available_rooms, conflicting_rooms, day_view, duration_to_slot_count, room_occupancy, Day, SlotEdit,
    SlotView,
};
use crate::store::{lock, ScheduleStore};

pub struct AppState {
    pub store: Arc<dyn ScheduleStore>,
    pub context: Arc<Mutex<PlanningContext>>,
    pub commands: UnboundedSender<SlotCommand>,
}

impl AppState {
    /// Wires the debounced dispatcher to the same store and context as the handlers
    pub fn new(store: Arc<dyn ScheduleStore>, context: PlanningContext, debounce: Duration) -> Self {
        let context = Arc::new(Mutex::new(context));
        let sink_store = Arc::clone(&store);
        let sink_context = Arc::clone(&context);
        let commands = spawn_dispatcher(debounce, move |command: SlotCommand| {
            let SlotKey { day, room, index } = &command.key;
            let result = lock(&sink_context).apply(sink_store.as_ref(), *day, room, *index, &command.edit);
            if let Err(e) = result {
                warn!("Dropped queued edit for {}[{}] on {}: {}", room, index, day, e);
            }
        });
        AppState {
            store,
            context,
            commands,
        }
    }

    fn context(&self) -> MutexGuard<'_, PlanningContext> {
        lock(&self.context)
    }
}

#[derive(Serialize, Deserialize)]
pub struct DayResponse {
    pub day: Day,
    pub slots: Vec<SlotView>,
}

#[derive(Serialize, Deserialize)]
pub struct EditResponse {
    pub success: bool,
    pub slot: Option<SlotView>,
    /// Continuation slots marked or released by the edit
    pub changed: Vec<SlotView>,
}

#[derive(Serialize, Deserialize)]
pub struct ConflictResponse {
    pub conflict: bool,
    pub rooms: Vec<RoomId>,
}

#[derive(Deserialize)]
pub struct ConflictQuery {
    pub professor: Option<String>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub slot: usize,
    pub duration: Option<f64>,
}

#[derive(Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub slot: usize,
    pub slot_count: usize,
    pub rooms: Vec<RoomId>,
}

#[derive(Serialize, Deserialize)]
pub struct OccupancyResponse {
    pub room: RoomId,
    pub occupied: Vec<OccupiedSpan>,
}

// Day grid endpoint
async fn get_day(day: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, PlanningError> {
    let day: Day = day.parse()?;
    let mut context = state.context();
    let grid = *context.grid();
    let schedule = context.day(day, state.store.as_ref())?;

    Ok(HttpResponse::Ok().json(DayResponse {
        day,
        slots: day_view(schedule, &grid),
    }))
}

// Slot edit endpoint
async fn edit_slot(
    path: web::Path<(String, String, usize)>,
    edit: web::Json<SlotEdit>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, PlanningError> {
    let (day, room, index) = path.into_inner();
    let day: Day = day.parse()?;

    let mut views = state.context().apply(state.store.as_ref(), day, &room, index, &edit)?;
    info!("Updated {}[{}] on {} ({} slots changed)", room, index, day, views.len());

    let slot = (!views.is_empty()).then(|| views.remove(0));
    Ok(HttpResponse::Ok().json(EditResponse {
        success: true,
        slot,
        changed: views,
    }))
}

// Debounced edit endpoint, checked against the current day before queueing
async fn queue_edit(
    path: web::Path<(String, String, usize)>,
    edit: web::Json<SlotEdit>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, PlanningError> {
    let (day, room, index) = path.into_inner();
    let day: Day = day.parse()?;
    state.context().validate(state.store.as_ref(), day, &room, index, &edit)?;

    let key = SlotKey { day, room, index };
    if state
        .commands
        .send(SlotCommand {
            key,
            edit: edit.into_inner(),
        })
        .is_err()
    {
        warn!("Edit dispatcher is gone, queued edit dropped");
        return Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "success": false,
            "error": "Edit queue closed"
        })));
    }

    Ok(HttpResponse::Accepted().json(serde_json::json!({"success": true, "queued": true})))
}

// Professor conflict endpoint
async fn get_conflicts(
    path: web::Path<(String, String, usize)>,
    query: web::Query<ConflictQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, PlanningError> {
    let (day, room, index) = path.into_inner();
    let day: Day = day.parse()?;
    let mut context = state.context();
    let schedule = context.day(day, state.store.as_ref())?;

    let rooms = conflicting_rooms(schedule, &room, index, query.professor.as_deref());
    Ok(HttpResponse::Ok().json(ConflictResponse {
        conflict: !rooms.is_empty(),
        rooms,
    }))
}

// Free rooms endpoint
async fn get_available_rooms(
    day: web::Path<String>,
    query: web::Query<AvailabilityQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, PlanningError> {
    let day: Day = day.parse()?;
    let duration = query.duration.unwrap_or(1.0);
    let slot_count = duration_to_slot_count(duration)
        .ok_or(PlanningError::InvalidDuration(duration))?
        .max(1);

    let mut context = state.context();
    let schedule = context.day(day, state.store.as_ref())?;
    Ok(HttpResponse::Ok().json(AvailabilityResponse {
        slot: query.slot,
        slot_count,
        rooms: available_rooms(schedule, query.slot, slot_count),
    }))
}

// Room occupancy endpoint
async fn get_occupancy(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, PlanningError> {
    let (day, room) = path.into_inner();
    let day: Day = day.parse()?;
    let mut context = state.context();
    let schedule = context.day(day, state.store.as_ref())?;
    if !schedule.rooms.contains_key(&room) {
        return Err(PlanningError::InvalidReference(format!("room {}", room)));
    }

    Ok(HttpResponse::Ok().json(OccupancyResponse {
        occupied: room_occupancy(schedule, &room),
        room,
    }))
}

// Context reload endpoint
async fn reload(state: web::Data<AppState>) -> Result<HttpResponse, PlanningError> {
    state.context().reload(state.store.as_ref())?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/reload", web::post().to(reload))
        .route("/api/days/{day}", web::get().to(get_day))
        .route("/api/days/{day}/available-rooms", web::get().to(get_available_rooms))
        .route("/api/days/{day}/rooms/{room}/occupancy", web::get().to(get_occupancy))
        .route("/api/days/{day}/rooms/{room}/slots/{index}", web::post().to(edit_slot))
        .route("/api/days/{day}/rooms/{room}/slots/{index}/queue", web::post().to(queue_edit))
        .route("/api/days/{day}/rooms/{room}/slots/{index}/conflicts", web::get().to(get_conflicts));
}

pub async fn start_server(bind: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((bind, port))?
    .run()
    .await
}
