use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub inquiry_id: i64,
    pub sender_id: i64,
    pub content: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub inquiry_id: i64,
    pub content: String,
}

impl SendMessageRequest {
    pub fn validate(&self) -> Result<()> {
        super::inquiry::validate_message(&self.content)
    }
}
