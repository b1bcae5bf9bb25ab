//! Contest result records

use serde::{Deserialize, Serialize};

use super::SessionId;

/// A result row ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub session_id: SessionId,
    pub title: String,
    pub description: Option<String>,
    /// At least 1 when present
    pub rank: Option<i64>,
    pub team_name: Option<String>,
    /// Never negative when present
    pub score: Option<i64>,
    pub total_time: Option<String>,
    pub country: Option<String>,
    pub institute_name: Option<String>,
}

/// Result as read back from the store
#[derive(Debug, Clone, Serialize)]
pub struct StoredResult {
    pub id: i64,
    #[serde(flatten)]
    pub result: ResultRecord,
}
