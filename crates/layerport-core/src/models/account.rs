use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account and plan allowance, as returned by `GET /api/user/account`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub plan: String,
    pub conversions_left: i64,
    pub subscription_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_plan: Option<String>,
}

impl AccountInfo {
    pub fn has_conversions_left(&self) -> bool {
        self.conversions_left > 0
    }
}
