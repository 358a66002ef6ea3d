use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    /// e.g. `inquiry_received`, `inquiry_status`, `application_update`.
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub related_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    #[serde(alias = "unread_count")]
    pub count: u64,
}
