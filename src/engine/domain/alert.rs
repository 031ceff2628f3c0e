//! In-memory alert events and the severity mapping / notify rule
//! (spec.md §3, §4.7). Grounded on
//! `examples/original_source/.../notifications/domain/alert_event.go`.

use super::target::TargetStatus;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlertSeverity {
    Ok,
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertSeverity::Ok => "OK",
            AlertSeverity::Warning => "WARNING",
            AlertSeverity::Critical => "CRITICAL",
            AlertSeverity::Info => "INFO",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    Monitoring,
    System,
}

/// Registry-style severity mapping (spec.md §4.7) — extensible by adding a
/// table entry, never by growing a `match`.
pub struct SeverityMapper {
    table: HashMap<TargetStatus, AlertSeverity>,
}

impl SeverityMapper {
    pub fn new() -> Self {
        let mut table = HashMap::new();
        table.insert(TargetStatus::Up, AlertSeverity::Ok);
        table.insert(TargetStatus::Down, AlertSeverity::Critical);
        table.insert(TargetStatus::Degraded, AlertSeverity::Warning);
        table.insert(TargetStatus::Flapping, AlertSeverity::Warning);
        table.insert(TargetStatus::Unstable, AlertSeverity::Warning);
        table.insert(TargetStatus::Unknown, AlertSeverity::Info);
        Self { table }
    }

    pub fn map(&self, status: TargetStatus) -> AlertSeverity {
        self.table.get(&status).copied().unwrap_or(AlertSeverity::Info)
    }
}

impl Default for SeverityMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct AlertEvent {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub previous_severity: AlertSeverity,
    pub source: String,
    pub alert_type: AlertType,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub metadata: HashMap<String, String>,
}

impl AlertEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        title: impl Into<String>,
        message: impl Into<String>,
        severity: AlertSeverity,
        previous_severity: AlertSeverity,
        source: impl Into<String>,
        alert_type: AlertType,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            severity,
            previous_severity,
            source: source.into(),
            alert_type,
            timestamp: chrono::Utc::now(),
            metadata,
        }
    }

    /// The "golden rule" (spec.md §4.7): emit only on a severity change.
    pub fn should_notify(&self) -> bool {
        self.severity != self.previous_severity
    }

    /// Human-readable rendering for logs and the reference notification
    /// consumer, grounded on `alert_event.go`'s `BuildMessage`.
    pub fn render(&self) -> String {
        format!(
            "[{}] {} | {} -> {} | {}",
            self.source, self.title, self.previous_severity, self.severity, self.message
        )
    }
}
