//! Rolling latency baseline per target — the three-phase statistics engine
//! (spec.md §4.5). The math here is pure (no I/O, no repository access);
//! `engine::pipeline::statistics_engine` wraps it with persistence.
//!
//! Ground truth: `examples/original_source/.../domain/statistics_calculator.go`
//! (`CalculateNewAverage`) and `target_statistics.go` (`UpdateState`), with
//! the Phase-3 sliding EMA added per spec.md §4.5 (the Go source's
//! `UpdateState` only implements phases 1-2; Phase 3 is this crate's
//! from-scratch implementation of the spec's explicit ratio formula).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetStatistics {
    pub target_id: Uuid,
    pub avg_response_time_ms: u32,
    pub total_checks_count: u32,
}

impl TargetStatistics {
    pub fn new(target_id: Uuid) -> Self {
        Self {
            target_id,
            avg_response_time_ms: 0,
            total_checks_count: 0,
        }
    }

    /// Fold one new sample (`k` observations, commonly 1) into the baseline.
    /// `max_checks` bounds the sliding window (spec.md §4.5's `maxChecks`).
    pub fn fold_sample(&mut self, new_sample_ms: u32, k: u32, max_checks: u32) {
        let max_checks = max_checks.max(1);

        if self.total_checks_count == 0 {
            // Phase 1: cold start.
            self.avg_response_time_ms = new_sample_ms;
        } else if self.total_checks_count < max_checks {
            // Phase 2: weighted arithmetic mean accumulation.
            let total = self.total_checks_count as f64;
            let new_k = k as f64;
            let weighted = (self.avg_response_time_ms as f64 * total) + (new_sample_ms as f64 * new_k);
            self.avg_response_time_ms = round_nearest(weighted / (total + new_k));
        } else {
            // Phase 3: sliding EMA.
            let ratio = (k as f64 / max_checks as f64).min(1.0);
            let next = (self.avg_response_time_ms as f64) * (1.0 - ratio) + (new_sample_ms as f64) * ratio;
            self.avg_response_time_ms = round_nearest(next);
        }

        self.total_checks_count = (self.total_checks_count + k).min(max_checks);
    }
}

fn round_nearest(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_start_takes_the_first_sample() {
        let mut stats = TargetStatistics::new(Uuid::new_v4());
        stats.fold_sample(120, 1, 2016);
        assert_eq!(stats.avg_response_time_ms, 120);
        assert_eq!(stats.total_checks_count, 1);
    }

    #[test]
    fn accumulation_phase_weights_by_total_checks() {
        let mut stats = TargetStatistics::new(Uuid::new_v4());
        stats.fold_sample(100, 1, 2016);
        stats.fold_sample(400, 1, 2016);
        // (100*1 + 400*1) / 2 = 250
        assert_eq!(stats.avg_response_time_ms, 250);
        assert_eq!(stats.total_checks_count, 2);
    }

    #[test]
    fn total_checks_caps_at_max_checks() {
        let mut stats = TargetStatistics::new(Uuid::new_v4());
        for _ in 0..10 {
            stats.fold_sample(100, 1, 5);
        }
        assert_eq!(stats.total_checks_count, 5);
    }

    #[test]
    fn total_checks_is_monotone_non_decreasing() {
        let mut stats = TargetStatistics::new(Uuid::new_v4());
        let mut prev = 0;
        for sample in [50, 60, 70, 80, 90, 100, 110] {
            stats.fold_sample(sample, 1, 5);
            assert!(stats.total_checks_count >= prev);
            prev = stats.total_checks_count;
        }
    }

    #[test]
    fn avg_never_goes_negative() {
        let mut stats = TargetStatistics::new(Uuid::new_v4());
        stats.fold_sample(0, 1, 2016);
        assert!(stats.avg_response_time_ms == 0);
    }

    #[test]
    fn phase3_moves_by_roughly_the_ratio() {
        let mut stats = TargetStatistics {
            target_id: Uuid::new_v4(),
            avg_response_time_ms: 100,
            total_checks_count: 2016,
        };
        stats.fold_sample(1000, 1, 2016);
        // ratio = 1/2016 ~= 0.000496; avg should barely move but move toward 1000.
        assert!(stats.avg_response_time_ms > 100);
        assert!(stats.avg_response_time_ms < 102);
        assert_eq!(stats.total_checks_count, 2016);
    }

    #[test]
    fn rounding_is_round_to_nearest_not_truncating() {
        // 100*1 + 101*1 = 201 / 2 = 100.5 -> rounds to 101, not 100.
        let mut stats = TargetStatistics {
            target_id: Uuid::new_v4(),
            avg_response_time_ms: 100,
            total_checks_count: 1,
        };
        stats.fold_sample(101, 1, 2016);
        assert_eq!(stats.avg_response_time_ms, 101);
    }
}
