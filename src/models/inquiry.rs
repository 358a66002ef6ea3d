use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

pub const MAX_INQUIRY_LEN: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    #[default]
    Pending,
    Responded,
    Accepted,
    Rejected,
    Closed,
}

impl InquiryStatus {
    pub fn is_open(self) -> bool {
        matches!(self, InquiryStatus::Pending | InquiryStatus::Responded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryReply {
    pub id: i64,
    pub sender_id: i64,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: i64,
    pub pet_id: i64,
    /// The adopter who opened the thread.
    pub user_id: i64,
    pub owner_id: i64,
    pub message: String,
    #[serde(default)]
    pub status: InquiryStatus,
    #[serde(default)]
    pub replies: Vec<InquiryReply>,
    #[serde(default)]
    pub pet_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInquiryRequest {
    pub pet_id: i64,
    pub message: String,
}

impl CreateInquiryRequest {
    pub fn validate(&self) -> Result<()> {
        validate_message(&self.message)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInquiryStatusRequest {
    pub status: InquiryStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryReplyRequest {
    pub message: String,
}

impl InquiryReplyRequest {
    pub fn validate(&self) -> Result<()> {
        validate_message(&self.message)
    }
}

pub(crate) fn validate_message(message: &str) -> Result<()> {
    let len = message.trim().chars().count();
    if len == 0 {
        return Err(ApiError::Validation("message cannot be empty".into()));
    }
    if len > MAX_INQUIRY_LEN {
        return Err(ApiError::Validation(format!(
            "message is limited to {} characters",
            MAX_INQUIRY_LEN
        )));
    }
    Ok(())
}
