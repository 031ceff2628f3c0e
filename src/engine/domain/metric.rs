//! Time-series point — one per completed session, always written (spec.md §3).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub target_id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub response_time_ms: u32,
    pub reachable: bool,
}

impl Metric {
    pub fn new(target_id: Uuid, timestamp: chrono::DateTime<chrono::Utc>, response_time_ms: u32, reachable: bool) -> Self {
        Self {
            target_id,
            timestamp,
            response_time_ms,
            reachable,
        }
    }
}
