//! Session persistence.
//!
//! The access token, refresh token and the cached [`User`] live in a small
//! key/value store, the same way the mobile app keeps them in AsyncStorage and
//! the web app in `localStorage`. [`StorageService`] owns the key layout;
//! [`KeyValueStore`] implementations only move strings around.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::error::StorageError;
use crate::models::User;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    async fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove_item(key).await?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub access_token: String,
    pub refresh_token: String,
    pub user: String,
    /// Older builds stored the access token under this key.
    pub legacy_access_token: Option<String>,
}

impl StorageKeys {
    pub fn mobile() -> Self {
        Self {
            access_token: "@onlycats_access_token".to_string(),
            refresh_token: "@onlycats_refresh_token".to_string(),
            user: "@onlycats_user".to_string(),
            legacy_access_token: None,
        }
    }

    pub fn web() -> Self {
        Self {
            access_token: "access_token".to_string(),
            refresh_token: "refresh_token".to_string(),
            user: "user".to_string(),
            legacy_access_token: Some("token".to_string()),
        }
    }
}

#[derive(Clone)]
pub struct StorageService {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl StorageService {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    pub fn in_memory(keys: StorageKeys) -> Self {
        Self::new(Arc::new(MemoryStore::new()), keys)
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub async fn save_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), StorageError> {
        self.store.set_item(&self.keys.access_token, access_token).await?;
        self.store.set_item(&self.keys.refresh_token, refresh_token).await
    }

    pub async fn save_access_token(&self, access_token: &str) -> Result<(), StorageError> {
        self.store.set_item(&self.keys.access_token, access_token).await
    }

    pub async fn get_access_token(&self) -> Result<Option<String>, StorageError> {
        if let Some(token) = non_empty(self.store.get_item(&self.keys.access_token).await?) {
            return Ok(Some(token));
        }
        match &self.keys.legacy_access_token {
            Some(legacy) => Ok(non_empty(self.store.get_item(legacy).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_refresh_token(&self) -> Result<Option<String>, StorageError> {
        Ok(non_empty(self.store.get_item(&self.keys.refresh_token).await?))
    }

    pub async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let json = serde_json::to_string(user)?;
        self.store.set_item(&self.keys.user, &json).await
    }

    /// Returns the cached user. A corrupt entry is removed and reported as absent.
    pub async fn get_user(&self) -> Result<Option<User>, StorageError> {
        let Some(raw) = self.store.get_item(&self.keys.user).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!(key = %self.keys.user, error = %err, "dropping unreadable cached user");
                self.store.remove_item(&self.keys.user).await?;
                Ok(None)
            }
        }
    }

    pub async fn clear_all(&self) -> Result<(), StorageError> {
        let mut keys = vec![
            self.keys.access_token.as_str(),
            self.keys.refresh_token.as_str(),
            self.keys.user.as_str(),
        ];
        if let Some(legacy) = &self.keys.legacy_access_token {
            keys.push(legacy.as_str());
        }
        self.store.remove_items(&keys).await
    }

    pub async fn is_authenticated(&self) -> Result<bool, StorageError> {
        Ok(self.get_access_token().await?.is_some())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserType;

    fn sample_user() -> User {
        User {
            id: 7,
            email: "mia@example.com".into(),
            name: "Mia".into(),
            user_type: UserType::Shelter,
            phone: None,
            location: Some("Portland".into()),
            bio: None,
            avatar_url: None,
            is_active: true,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn tokens_round_trip_and_clear() {
        let storage = StorageService::in_memory(StorageKeys::mobile());
        assert!(!storage.is_authenticated().await.unwrap());

        storage.save_tokens("access-a", "refresh-r").await.unwrap();
        assert_eq!(storage.get_access_token().await.unwrap().as_deref(), Some("access-a"));
        assert_eq!(storage.get_refresh_token().await.unwrap().as_deref(), Some("refresh-r"));
        assert!(storage.is_authenticated().await.unwrap());

        storage.save_user(&sample_user()).await.unwrap();
        assert_eq!(storage.get_user().await.unwrap(), Some(sample_user()));

        storage.clear_all().await.unwrap();
        assert!(!storage.is_authenticated().await.unwrap());
        assert_eq!(storage.get_refresh_token().await.unwrap(), None);
        assert_eq!(storage.get_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn web_profile_falls_back_to_legacy_token() {
        let store = Arc::new(MemoryStore::new());
        store.set_item("token", "old-style").await.unwrap();
        let storage = StorageService::new(store.clone(), StorageKeys::web());

        assert_eq!(storage.get_access_token().await.unwrap().as_deref(), Some("old-style"));

        storage.clear_all().await.unwrap();
        assert_eq!(store.get_item("token").await.unwrap(), None);
        assert!(!storage.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_user_entry_is_dropped() {
        let store = Arc::new(MemoryStore::new());
        store.set_item("@onlycats_user", "{not json").await.unwrap();
        let storage = StorageService::new(store.clone(), StorageKeys::mobile());

        assert_eq!(storage.get_user().await.unwrap(), None);
        assert_eq!(store.get_item("@onlycats_user").await.unwrap(), None);
    }
}
