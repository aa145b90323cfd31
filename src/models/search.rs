use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ScheduleError,
    models::{interval::TimeInterval, ride::Location, user::UserId},
};

/// What a user is looking for, built per search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub departure: Location,
    pub destination: Location,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub requester: UserId,
}

impl SearchQuery {
    pub fn interval(&self) -> Result<TimeInterval, ScheduleError> {
        TimeInterval::new(self.departure_time, self.arrival_time)
    }
}
