use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::user::{UserId, UserProfile},
};

/// Resolves user ids to profiles. Accounts live outside this crate.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn profile(&self, id: UserId) -> Result<Option<UserProfile>, AppError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    profiles: Arc<RwLock<BTreeMap<UserId, UserProfile>>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect();
        Self {
            profiles: Arc::new(RwLock::new(profiles)),
        }
    }

    pub async fn insert(&self, profile: UserProfile) {
        self.profiles.write().await.insert(profile.id, profile);
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn profile(&self, id: UserId) -> Result<Option<UserProfile>, AppError> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }
}
