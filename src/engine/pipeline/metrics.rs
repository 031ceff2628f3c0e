//! Metrics Calculator (spec.md §4.3): folds a session's probes into
//! aggregate counts. Pure, no I/O.

use super::probe::ProbeResult;
use super::stability::Session;
use crate::engine::domain::TargetStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionMetrics {
    pub avg_response_time_ms: u32,
    pub max_response_time_ms: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub total_checks: u32,
    pub last_status: TargetStatus,
}

/// Compute the session metrics. Excludes DEGRADED probes from the average —
/// a load-bearing decision (spec.md §4.3): a slow 4xx must not pollute the
/// healthy-latency baseline.
pub fn calculate(session: &Session) -> SessionMetrics {
    let probes: &[ProbeResult] = &session.probes;

    let up_probes: Vec<&ProbeResult> = probes.iter().filter(|p| p.status == TargetStatus::Up).collect();
    let avg_response_time_ms = if up_probes.is_empty() {
        0
    } else {
        let sum: u64 = up_probes.iter().map(|p| p.response_time_ms as u64).sum();
        (sum / up_probes.len() as u64) as u32
    };

    let max_response_time_ms = probes.iter().map(|p| p.response_time_ms).max().unwrap_or(0);

    let success_count = probes
        .iter()
        .filter(|p| matches!(p.status, TargetStatus::Up | TargetStatus::Degraded))
        .count() as u32;

    let failure_count = probes.iter().filter(|p| p.status == TargetStatus::Down).count() as u32;

    let last_status = probes.last().map(|p| p.status).unwrap_or(TargetStatus::Unknown);

    SessionMetrics {
        avg_response_time_ms,
        max_response_time_ms,
        success_count,
        failure_count,
        total_checks: probes.len() as u32,
        last_status,
    }
}
