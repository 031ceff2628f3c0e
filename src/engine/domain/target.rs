//! The monitored entity and its state machine (spec.md §3, §4.6).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health classification vocabulary (spec.md §1, §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetStatus {
    Up,
    Down,
    Degraded,
    Flapping,
    Unstable,
    Unknown,
}

impl TargetStatus {
    /// Valid successor states per spec.md §4.6's state machine. `Unknown`
    /// may transition to anything; same-to-same is never valid.
    pub fn can_transition_to(self, next: TargetStatus) -> bool {
        use TargetStatus::*;
        if self == next {
            return false;
        }
        match self {
            Unknown => true,
            Up => matches!(next, Down | Degraded | Flapping | Unstable),
            Down => matches!(next, Up | Flapping | Unstable),
            Degraded => matches!(next, Up | Down | Unstable),
            Flapping => matches!(next, Up | Down | Unstable),
            Unstable => matches!(next, Up | Down | Flapping | Degraded),
        }
    }
}

impl std::fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TargetStatus::Up => "UP",
            TargetStatus::Down => "DOWN",
            TargetStatus::Degraded => "DEGRADED",
            TargetStatus::Flapping => "FLAPPING",
            TargetStatus::Unstable => "UNSTABLE",
            TargetStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    Web,
    Api,
}

/// Per-target check policy (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfiguration {
    pub timeout_seconds: u32,
    pub retry_count: u32,
    pub retry_delay_seconds: u32,
    pub check_interval_seconds: u32,
    pub alert_on_failure: bool,
    pub alert_on_recovery: bool,
}

impl Default for CheckConfiguration {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            retry_count: 0,
            retry_delay_seconds: 5,
            check_interval_seconds: 300,
            alert_on_failure: true,
            alert_on_recovery: true,
        }
    }
}

impl CheckConfiguration {
    /// Clamp to the ranges spec.md §3 declares. Out-of-range inputs are
    /// repaired rather than rejected (ConfigurationError is default-repaired
    /// per spec.md §7).
    pub fn sanitized(mut self) -> Self {
        self.timeout_seconds = self.timeout_seconds.clamp(1, 60);
        self.retry_count = self.retry_count.clamp(0, 10);
        self.retry_delay_seconds = self.retry_delay_seconds.clamp(1, 60);
        self.check_interval_seconds = self.check_interval_seconds.clamp(30, 3600);
        self
    }
}

/// A monitored HTTP endpoint with ownership and policy (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub url: String,
    pub target_type: TargetType,
    pub is_active: bool,
    pub configuration: CheckConfiguration,

    pub previous_status: TargetStatus,
    pub current_status: TargetStatus,
    pub last_checked_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_response_time_ms: u32,
    pub next_check_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Target {
    pub fn new(owner_user_id: Uuid, name: impl Into<String>, url: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_user_id,
            name: name.into(),
            url: url.into(),
            target_type,
            is_active: true,
            configuration: CheckConfiguration::default(),
            previous_status: TargetStatus::Unknown,
            current_status: TargetStatus::Unknown,
            last_checked_at: None,
            last_response_time_ms: 0,
            next_check_at: None,
        }
    }

    /// `is_active && due`, per spec.md §4.10's selection predicate.
    pub fn is_due(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.is_active && self.next_check_at.map(|t| t <= now).unwrap_or(true)
    }

    /// Attempt the transition described in spec.md §4.6. Same-to-same and
    /// disallowed successors are rejected; the target row itself is still
    /// touched by the caller regardless (§7 InvalidTransitionError policy).
    pub fn transition_to(&mut self, next: TargetStatus) -> Result<(), crate::engine::error::EngineError> {
        if !self.current_status.can_transition_to(next) {
            return Err(crate::engine::error::EngineError::InvalidTransition {
                from: self.current_status,
                to: next,
            });
        }
        self.previous_status = self.current_status;
        self.current_status = next;
        Ok(())
    }
}
