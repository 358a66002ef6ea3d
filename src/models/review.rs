use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub reviewer_id: i64,
    /// The shelter or individual being reviewed.
    pub target_id: i64,
    pub rating: u8,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub target_id: i64,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<String>,
}

impl CreateReviewRequest {
    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(ApiError::Validation(format!(
                "rating must be between 1 and 5, got {}",
                self.rating
            )));
        }
        Ok(())
    }
}
