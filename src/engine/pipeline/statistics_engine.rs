//! Repository-backed wrapper around the pure baseline math in
//! `engine::domain::statistics` (spec.md §4.5). Gating on `total_checks ≤ 4`
//! lives in the Orchestrator (spec.md §4.9 step 2), not here — this module
//! only knows how to read, fold, and save.

use crate::engine::config::EngineConfig;
use crate::engine::domain::TargetStatistics;
use crate::engine::error::EngineResult;
use crate::engine::repository::StatisticsRepository;
use std::sync::Arc;
use uuid::Uuid;

pub struct StatisticsEngine {
    repository: Arc<dyn StatisticsRepository>,
}

impl StatisticsEngine {
    pub fn new(repository: Arc<dyn StatisticsRepository>) -> Self {
        Self { repository }
    }

    pub async fn baseline_for(&self, target_id: Uuid) -> EngineResult<TargetStatistics> {
        self.repository.get(target_id).await
    }

    /// Fold `new_sample_ms` into `target_id`'s baseline and persist it.
    /// `check_interval_secs` derives `maxChecks` via `EngineConfig`.
    pub async fn record_sample(&self, target_id: Uuid, new_sample_ms: u32, check_interval_secs: u32, config: &EngineConfig) -> EngineResult<TargetStatistics> {
        let mut stats = self.repository.get(target_id).await?;
        let max_checks = config.max_checks_for_interval(check_interval_secs);
        stats.fold_sample(new_sample_ms, 1, max_checks);
        self.repository.save(stats.clone()).await?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::repository::memory::InMemoryStatisticsRepository;

    #[tokio::test]
    async fn record_sample_persists_the_fold() {
        let repo = Arc::new(InMemoryStatisticsRepository::new());
        let engine = StatisticsEngine::new(repo);
        let target_id = Uuid::new_v4();
        let config = EngineConfig::default();

        engine.record_sample(target_id, 100, 300, &config).await.unwrap();
        let after_first = engine.baseline_for(target_id).await.unwrap();
        assert_eq!(after_first.avg_response_time_ms, 100);
        assert_eq!(after_first.total_checks_count, 1);

        engine.record_sample(target_id, 300, 300, &config).await.unwrap();
        let after_second = engine.baseline_for(target_id).await.unwrap();
        assert_eq!(after_second.avg_response_time_ms, 200);
        assert_eq!(after_second.total_checks_count, 2);
    }
}
