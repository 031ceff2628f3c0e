//! Append-only event log row — one per confirmed state transition (spec.md §3).

use super::target::TargetStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub id: Uuid,
    pub target_id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub status: TargetStatus,
    pub avg_response_time_ms: u32,
    pub error_message: Option<String>,
}

impl CheckResult {
    pub fn new(
        target_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
        status: TargetStatus,
        avg_response_time_ms: u32,
        error_message: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_id,
            timestamp,
            status,
            avg_response_time_ms,
            error_message,
        }
    }
}
