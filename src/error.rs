//! Error types for the planning service.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::schedule::Day;

/// Errors from planning operations.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// A professor, room, equipment or slot reference is not in the snapshot.
    #[error("Unknown reference: {0}")]
    InvalidReference(String),

    /// The requested span collides with a booking or runs past the end of the day.
    #[error("requested duration unavailable: {duration} slots from {room}[{index}] on {day}")]
    DurationUnavailable {
        day: Day,
        room: String,
        index: usize,
        duration: f64,
    },

    /// A continuation slot cannot carry an independent assignment.
    #[error("Slot {room}[{index}] continues the previous course")]
    ContinuationSlot { room: String, index: usize },

    #[error("Invalid duration: {0}")]
    InvalidDuration(f64),

    #[error("Unknown day: {0}")]
    UnknownDay(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl ResponseError for PlanningError {
    fn status_code(&self) -> StatusCode {
        match self {
            PlanningError::InvalidReference(_) | PlanningError::UnknownDay(_) => StatusCode::NOT_FOUND,
            PlanningError::DurationUnavailable { .. } | PlanningError::ContinuationSlot { .. } => StatusCode::CONFLICT,
            PlanningError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
            PlanningError::Csv(_) | PlanningError::Io(_) | PlanningError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            PlanningError::DurationUnavailable { .. } => "requested duration unavailable".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": message,
        }))
    }
}
