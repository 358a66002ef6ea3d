use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{AddFavoriteRequest, Favorite};

pub struct FavoriteService<'a> {
    client: &'a ApiClient,
}

impl<'a> FavoriteService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Favorite>> {
        self.client.get("/matches/favorites").await
    }

    pub async fn add(&self, pet_id: i64) -> Result<Favorite> {
        self.client
            .post("/matches/favorites", &AddFavoriteRequest { pet_id })
            .await
    }

    pub async fn remove(&self, pet_id: i64) -> Result<()> {
        self.client
            .delete(&format!("/matches/favorites/{}", pet_id))
            .await
    }

    pub async fn is_favorite(&self, pet_id: i64) -> Result<bool> {
        Ok(self.list().await?.iter().any(|f| f.pet_id == pet_id))
    }
}

/// Local view of the user's favorites with optimistic toggling.
///
/// `toggle` flips the local state first and reverts it when the server write
/// fails, so screens can render the new heart state immediately.
pub struct FavoritesCache {
    client: ApiClient,
    ids: Mutex<HashSet<i64>>,
}

impl FavoritesCache {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            ids: Mutex::new(HashSet::new()),
        }
    }

    fn ids(&self) -> MutexGuard<'_, HashSet<i64>> {
        self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contains(&self, pet_id: i64) -> bool {
        self.ids().contains(&pet_id)
    }

    pub fn pet_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.ids().iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Replaces the local set with the server's list.
    pub async fn sync(&self) -> Result<()> {
        let favorites = self.client.favorites().list().await?;
        *self.ids() = favorites.into_iter().map(|f| f.pet_id).collect();
        Ok(())
    }

    /// Returns whether the pet is a favorite after the call.
    pub async fn toggle(&self, pet_id: i64) -> Result<bool> {
        let now_favorite = {
            let mut ids = self.ids();
            if ids.remove(&pet_id) {
                false
            } else {
                ids.insert(pet_id);
                true
            }
        };

        let outcome = if now_favorite {
            self.client.favorites().add(pet_id).await.map(|_| ())
        } else {
            self.client.favorites().remove(pet_id).await
        };

        if let Err(err) = outcome {
            warn!(pet_id, error = %err, "favorite update failed, reverting");
            let mut ids = self.ids();
            if now_favorite {
                ids.remove(&pet_id);
            } else {
                ids.insert(pet_id);
            }
            return Err(err);
        }
        Ok(now_favorite)
    }
}
