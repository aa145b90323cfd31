use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{
    error::AppError,
    models::{ride::RideRecord, user::UserProfile},
};

/// Rides and profiles as kept in a seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub rides: Vec<RideRecord>,
    #[serde(default)]
    pub users: Vec<UserProfile>,
}

/// Reads and writes the JSON seed file used to populate in-memory stores.
#[derive(Clone)]
pub struct StorageService {
    path: Arc<PathBuf>,
}

impl StorageService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Arc::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load_seed(&self) -> Result<SeedData, AppError> {
        if !fs::try_exists(self.path()).await? {
            return Ok(SeedData::default());
        }
        let raw = fs::read(self.path()).await?;
        if raw.is_empty() {
            return Ok(SeedData::default());
        }
        let seed: SeedData =
            serde_json::from_slice(&raw).map_err(|err| AppError::Other(err.into()))?;
        Ok(seed)
    }

    pub async fn save_seed(&self, seed: &SeedData) -> Result<(), AppError> {
        if let Some(parent) = self.path().parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(seed).map_err(|err| AppError::Other(err.into()))?;
        fs::write(self.path(), data).await?;
        Ok(())
    }
}
