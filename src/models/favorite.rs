use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Pet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub pet_id: i64,
    /// Embedded when the backend expands the relation.
    #[serde(default)]
    pub pet: Option<Pet>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFavoriteRequest {
    pub pet_id: i64,
}
