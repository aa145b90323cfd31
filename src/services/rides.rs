use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    engine::{conflict, ranking},
    error::AppError,
    models::{
        ride::{NewRide, RideId, RideRecord, UserRide},
        search::SearchQuery,
        user::{UserId, UserProfile, UserRole},
    },
    services::{store::RideStore, users::UserDirectory},
};

/// A ride together with the profiles of everyone on board.
#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    pub ride: RideRecord,
    pub driver: Option<UserProfile>,
    pub passengers: Vec<UserProfile>,
}

/// Ride operations on behalf of an acting user. Scheduling decisions come
/// from the engine; every mutation goes through the store.
#[derive(Clone)]
pub struct RideService {
    store: Arc<dyn RideStore>,
    users: Arc<dyn UserDirectory>,
    max_results: Option<usize>,
}

impl RideService {
    pub fn new(store: Arc<dyn RideStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            store,
            users,
            max_results: None,
        }
    }

    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    pub async fn create_ride(&self, new: NewRide) -> Result<RideRecord, AppError> {
        let window = new.interval()?;
        if new.seats < 0 {
            return Err(AppError::InvalidSeats(new.seats));
        }

        let committed = self.store.for_user(new.driver).await?;
        if let Some(clash) = conflict::conflicting_ride(&window, new.driver, &committed)? {
            debug!(driver = %new.driver, ride = %clash.id, "ride offer clashes");
            return Err(AppError::TimeConflict { ride: clash.id });
        }

        let ride = self.store.create(new).await?;
        info!(ride = %ride.id, driver = %ride.driver, "ride created");
        Ok(ride)
    }

    pub async fn join_ride(&self, ride_id: RideId, user: UserId) -> Result<RideRecord, AppError> {
        let ride = self.require_ride(ride_id).await?;
        if ride.is_driver(user) {
            return Err(AppError::OwnRide);
        }
        if ride.is_passenger(user) {
            return Err(AppError::AlreadyJoined);
        }
        if !ride.has_free_seats() {
            return Err(AppError::NoSeatsLeft);
        }

        let committed = self.store.for_user(user).await?;
        if let Some(clash) = conflict::find_user_conflict(&ride, user, &committed)? {
            debug!(%user, ride = %ride.id, clash = %clash.id, "join clashes");
            return Err(AppError::TimeConflict { ride: clash.id });
        }

        let ride = self.store.add_passenger(ride_id, user).await?;
        info!(ride = %ride.id, %user, seats = ride.seats, "passenger joined");
        Ok(ride)
    }

    pub async fn leave_ride(&self, ride_id: RideId, user: UserId) -> Result<RideRecord, AppError> {
        let ride = self.require_ride(ride_id).await?;
        if !ride.is_passenger(user) {
            return Err(AppError::NotAPassenger);
        }
        let ride = self.store.remove_passenger(ride_id, user).await?;
        info!(ride = %ride.id, %user, seats = ride.seats, "passenger left");
        Ok(ride)
    }

    /// Drivers may delete their own rides; admins may delete any.
    pub async fn delete_ride(&self, ride_id: RideId, acting: UserId) -> Result<(), AppError> {
        let ride = self.require_ride(ride_id).await?;
        if !ride.is_driver(acting) && !self.is_admin(acting).await? {
            return Err(AppError::Forbidden);
        }
        if !self.store.delete(ride_id).await? {
            return Err(AppError::NotFound);
        }
        info!(ride = %ride_id, %acting, "ride deleted");
        Ok(())
    }

    pub async fn rides_for_user(&self, user: UserId) -> Result<Vec<UserRide>, AppError> {
        let rides = self.store.for_user(user).await?;
        Ok(rides
            .into_iter()
            .filter_map(|ride| ride.role_of(user).map(|role| UserRide { ride, role }))
            .collect())
    }

    pub async fn is_user_busy(&self, ride_id: RideId, user: UserId) -> Result<bool, AppError> {
        let ride = self.require_ride(ride_id).await?;
        let committed = self.store.for_user(user).await?;
        Ok(conflict::is_user_busy(&ride, user, &committed)?)
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<RideRecord>, AppError> {
        let pool = self.store.all().await?;
        let ranked = ranking::rank(&pool, query)?;
        let limit = self.max_results.unwrap_or(usize::MAX);
        Ok(ranked.into_iter().take(limit).cloned().collect())
    }

    pub async fn roster(&self, ride_id: RideId) -> Result<Roster, AppError> {
        let ride = self.require_ride(ride_id).await?;
        let driver = self.lookup(ride.driver).await?;
        let mut passengers = Vec::with_capacity(ride.passengers.len());
        for id in &ride.passengers {
            if let Some(profile) = self.lookup(*id).await? {
                passengers.push(profile);
            }
        }
        Ok(Roster {
            ride,
            driver,
            passengers,
        })
    }

    async fn require_ride(&self, ride_id: RideId) -> Result<RideRecord, AppError> {
        self.store.get(ride_id).await?.ok_or(AppError::NotFound)
    }

    async fn lookup(&self, user: UserId) -> Result<Option<UserProfile>, AppError> {
        let profile = self.users.profile(user).await?;
        if profile.is_none() {
            warn!(%user, "no profile for user");
        }
        Ok(profile)
    }

    async fn is_admin(&self, user: UserId) -> Result<bool, AppError> {
        Ok(self
            .users
            .profile(user)
            .await?
            .is_some_and(|profile| profile.role == UserRole::Admin))
    }
}
