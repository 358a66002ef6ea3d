use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Withdrawn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub pet_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub home_type: Option<String>,
    #[serde(default)]
    pub has_other_pets: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitApplicationRequest {
    pub pet_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_other_pets: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}
