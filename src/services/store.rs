use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        ride::{NewRide, RideId, RideRecord},
        user::UserId,
    },
};

/// Persistence for rides. Implementations own the seat and passenger
/// mutations and must serialize them per ride.
#[async_trait]
pub trait RideStore: Send + Sync {
    async fn create(&self, ride: NewRide) -> Result<RideRecord, AppError>;
    async fn get(&self, id: RideId) -> Result<Option<RideRecord>, AppError>;
    async fn all(&self) -> Result<Vec<RideRecord>, AppError>;
    /// Rides the user drives or rides in.
    async fn for_user(&self, user: UserId) -> Result<Vec<RideRecord>, AppError>;
    async fn delete(&self, id: RideId) -> Result<bool, AppError>;
    /// Adds `user` as a passenger and takes one seat.
    async fn add_passenger(&self, id: RideId, user: UserId) -> Result<RideRecord, AppError>;
    /// Removes `user` from the passengers and frees their seat.
    async fn remove_passenger(&self, id: RideId, user: UserId) -> Result<RideRecord, AppError>;
}

#[derive(Debug, Default)]
struct Rides {
    next_id: i64,
    by_id: BTreeMap<RideId, RideRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRideStore {
    inner: Arc<RwLock<Rides>>,
}

impl MemoryRideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rides(rides: impl IntoIterator<Item = RideRecord>) -> Self {
        let by_id: BTreeMap<RideId, RideRecord> =
            rides.into_iter().map(|ride| (ride.id, ride)).collect();
        let next_id = by_id.keys().next_back().map_or(0, |id| id.0);
        Self {
            inner: Arc::new(RwLock::new(Rides { next_id, by_id })),
        }
    }
}

#[async_trait]
impl RideStore for MemoryRideStore {
    async fn create(&self, ride: NewRide) -> Result<RideRecord, AppError> {
        let mut rides = self.inner.write().await;
        rides.next_id += 1;
        let record = ride.into_record(RideId(rides.next_id));
        rides.by_id.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: RideId) -> Result<Option<RideRecord>, AppError> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn all(&self) -> Result<Vec<RideRecord>, AppError> {
        Ok(self.inner.read().await.by_id.values().cloned().collect())
    }

    async fn for_user(&self, user: UserId) -> Result<Vec<RideRecord>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .by_id
            .values()
            .filter(|ride| ride.involves(user))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: RideId) -> Result<bool, AppError> {
        Ok(self.inner.write().await.by_id.remove(&id).is_some())
    }

    async fn add_passenger(&self, id: RideId, user: UserId) -> Result<RideRecord, AppError> {
        let mut rides = self.inner.write().await;
        let ride = rides.by_id.get_mut(&id).ok_or(AppError::NotFound)?;
        if ride.is_passenger(user) {
            return Err(AppError::AlreadyJoined);
        }
        if !ride.has_free_seats() {
            return Err(AppError::NoSeatsLeft);
        }
        ride.seats -= 1;
        ride.passengers.insert(user);
        Ok(ride.clone())
    }

    async fn remove_passenger(&self, id: RideId, user: UserId) -> Result<RideRecord, AppError> {
        let mut rides = self.inner.write().await;
        let ride = rides.by_id.get_mut(&id).ok_or(AppError::NotFound)?;
        if !ride.passengers.remove(&user) {
            return Err(AppError::NotAPassenger);
        }
        ride.seats += 1;
        Ok(ride.clone())
    }
}
