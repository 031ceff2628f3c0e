//! Core data model (spec.md §3).

pub mod alert;
pub mod check_result;
pub mod metric;
pub mod statistics;
pub mod target;

pub use alert::{AlertEvent, AlertSeverity, AlertType, SeverityMapper};
pub use check_result::CheckResult;
pub use metric::Metric;
pub use statistics::TargetStatistics;
pub use target::{CheckConfiguration, Target, TargetStatus, TargetType};
