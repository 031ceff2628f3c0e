//! Result Analyzer (spec.md §4.4): folds a session, its metrics, and the
//! historical baseline into a final status. Pure function — same inputs,
//! same output, no I/O.
//!
//! Ground truth: `examples/original_source/.../scheduler/result_analyzer.go`,
//! using the spec's resolution of that file's two documented inconsistencies
//! (3x-and->200ms degradation, not 2x; ≤4-probe baseline gating lives in the
//! orchestrator, not here).

use super::metrics::SessionMetrics;
use super::stability::Session;
use crate::engine::domain::{TargetStatistics, TargetStatus};

/// Applies the four ordered rules from spec.md §4.4. `min_latency_threshold_ms`
/// is the configured floor below which a 3x latency jump still doesn't count
/// as degradation (spec.md §6's `MIN_LATENCY_THRESHOLD_MS`).
pub fn analyze(session: &Session, metrics: &SessionMetrics, historical: &TargetStatistics, min_latency_threshold_ms: u32) -> TargetStatus {
    if !session.stable {
        return TargetStatus::Flapping;
    }

    let base = metrics.last_status;

    let is_degradation = base == TargetStatus::Up
        && historical.avg_response_time_ms > 0
        && (metrics.avg_response_time_ms as u64) >= 3 * historical.avg_response_time_ms as u64
        && metrics.avg_response_time_ms > min_latency_threshold_ms;

    let result = if is_degradation { TargetStatus::Degraded } else { base };

    if (5..=9).contains(&metrics.total_checks) {
        return TargetStatus::Unstable;
    }

    result
}
