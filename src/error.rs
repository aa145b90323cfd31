use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::ride::RideId;

/// Errors raised by the scheduling engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("malformed ride {id}: {reason}")]
    MalformedRecord { id: RideId, reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("time conflict with ride {ride}")]
    TimeConflict { ride: RideId },
    #[error("no seats left")]
    NoSeatsLeft,
    #[error("cannot join your own ride")]
    OwnRide,
    #[error("already joined this ride")]
    AlreadyJoined,
    #[error("not a passenger of this ride")]
    NotAPassenger,
    #[error("invalid seat count {0}")]
    InvalidSeats(i32),
}

impl AppError {
    /// True when the request itself was at fault and must not be retried as-is.
    pub fn is_client_error(&self) -> bool {
        match self {
            AppError::Config(_) | AppError::Io(_) | AppError::Other(_) => false,
            AppError::Schedule(_)
            | AppError::NotFound
            | AppError::Forbidden
            | AppError::TimeConflict { .. }
            | AppError::NoSeatsLeft
            | AppError::OwnRide
            | AppError::AlreadyJoined
            | AppError::NotAPassenger
            | AppError::InvalidSeats(_) => true,
        }
    }
}
