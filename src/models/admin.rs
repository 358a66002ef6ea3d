use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_pets: u64,
    #[serde(default)]
    pub available_pets: u64,
    #[serde(default)]
    pub adopted_pets: u64,
    #[serde(default)]
    pub open_inquiries: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetUserActiveRequest {
    pub is_active: bool,
}
