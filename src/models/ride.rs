use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ScheduleError,
    models::{interval::TimeInterval, user::UserId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(pub i64);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A named place. Only the name takes part in matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<GeoPoint>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinate: None,
        }
    }

    pub fn with_coordinate(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            coordinate: Some(GeoPoint { lat, lon }),
        }
    }

    pub fn same_place(&self, other: &Location) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideRole {
    #[serde(rename = "driver")]
    Driver,
    #[serde(rename = "passenger")]
    Passenger,
}

impl RideRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideRole::Driver => "driver",
            RideRole::Passenger => "passenger",
        }
    }
}

impl fmt::Display for RideRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ride offering as persisted. The window is kept raw; use
/// [`RideRecord::interval`] to get a validated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRecord {
    pub id: RideId,
    pub departure: Location,
    pub destination: Location,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    /// Seats still free. Negative values only come from corrupt rows.
    pub seats: i32,
    pub driver: UserId,
    #[serde(default)]
    pub passengers: BTreeSet<UserId>,
}

impl RideRecord {
    pub fn interval(&self) -> Result<TimeInterval, ScheduleError> {
        TimeInterval::new(self.departure_time, self.arrival_time)
    }

    pub fn has_free_seats(&self) -> bool {
        self.seats > 0
    }

    pub fn is_driver(&self, user: UserId) -> bool {
        self.driver == user
    }

    pub fn is_passenger(&self, user: UserId) -> bool {
        self.passengers.contains(&user)
    }

    pub fn involves(&self, user: UserId) -> bool {
        self.is_driver(user) || self.is_passenger(user)
    }

    pub fn role_of(&self, user: UserId) -> Option<RideRole> {
        if self.is_driver(user) {
            Some(RideRole::Driver)
        } else if self.is_passenger(user) {
            Some(RideRole::Passenger)
        } else {
            None
        }
    }
}

/// Payload for offering a new ride. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRide {
    pub departure: Location,
    pub destination: Location,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub seats: i32,
    pub driver: UserId,
}

impl NewRide {
    pub fn interval(&self) -> Result<TimeInterval, ScheduleError> {
        TimeInterval::new(self.departure_time, self.arrival_time)
    }

    pub fn into_record(self, id: RideId) -> RideRecord {
        RideRecord {
            id,
            departure: self.departure,
            destination: self.destination,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            seats: self.seats,
            driver: self.driver,
            passengers: BTreeSet::new(),
        }
    }
}

/// A ride seen from one user's side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRide {
    pub ride: RideRecord,
    pub role: RideRole,
}
