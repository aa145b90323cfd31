use std::sync::Arc;

use tracing::info;

use crate::{
    config::AppConfig,
    error::AppError,
    services::{
        rides::RideService, storage::StorageService, store::MemoryRideStore,
        users::MemoryUserDirectory,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: StorageService,
    pub store: MemoryRideStore,
    pub users: MemoryUserDirectory,
    pub rides: RideService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        storage: StorageService,
        store: MemoryRideStore,
        users: MemoryUserDirectory,
    ) -> Self {
        let rides = RideService::new(Arc::new(store.clone()), Arc::new(users.clone()))
            .with_max_results(config.max_search_results);
        Self {
            config,
            storage,
            store,
            users,
            rides,
        }
    }

    /// Builds in-memory stores from the configured seed file.
    pub async fn load(config: AppConfig) -> Result<Self, AppError> {
        let storage = StorageService::new(config.rides_file.clone());
        let seed = storage.load_seed().await?;
        info!(
            rides = seed.rides.len(),
            users = seed.users.len(),
            file = %storage.path().display(),
            "loaded seed data"
        );
        let store = MemoryRideStore::with_rides(seed.rides);
        let users = MemoryUserDirectory::with_profiles(seed.users);
        Ok(Self::new(config, storage, store, users))
    }
}
