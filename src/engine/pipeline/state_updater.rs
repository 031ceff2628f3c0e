//! State Updater (spec.md §4.6): the one place that mutates a `Target` row
//! and appends to the two append-only stores. Per-step failures are logged,
//! not propagated — losing a metric point must not stop the pipeline
//! (spec.md §7's `StorageError` policy).

use crate::engine::domain::{CheckResult, Metric, Target, TargetStatus};
use crate::engine::logging::EngineLogger;
use crate::engine::repository::{CheckResultRepository, MetricRepository, TargetRepository};
use std::sync::Arc;

pub struct StateUpdateOutcome {
    pub target: Target,
    pub transitioned: bool,
}

pub struct StateUpdater {
    targets: Arc<dyn TargetRepository>,
    metrics: Arc<dyn MetricRepository>,
    check_results: Arc<dyn CheckResultRepository>,
    logger: Arc<EngineLogger>,
}

impl StateUpdater {
    pub fn new(
        targets: Arc<dyn TargetRepository>,
        metrics: Arc<dyn MetricRepository>,
        check_results: Arc<dyn CheckResultRepository>,
        logger: Arc<EngineLogger>,
    ) -> Self {
        Self {
            targets,
            metrics,
            check_results,
            logger,
        }
    }

    /// Apply one session's outcome to `target`. Always writes a Metric row;
    /// writes a CheckResult row and transitions the target only on a real
    /// status change (spec.md §4.6 steps 1-5).
    pub async fn update(
        &self,
        mut target: Target,
        new_status: TargetStatus,
        response_time_ms: u32,
        reachable: bool,
        error_message: Option<String>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> StateUpdateOutcome {
        let transitioned = target.current_status != new_status;

        if transitioned {
            if let Err(err) = target.transition_to(new_status) {
                // InvalidTransitionError (spec.md §7): no-op for the event
                // log, but the target row and `last_checked_at` still move.
                self.logger.debug("StateUpdater", &format!("rejected transition: {err}"));
            }
        }

        target.last_response_time_ms = response_time_ms;
        target.last_checked_at = Some(now);
        let interval = target.configuration.check_interval_seconds.max(1);
        target.next_check_at = Some(now + chrono::Duration::seconds(interval as i64));

        let saved = match self.targets.save(target.clone()).await {
            Ok(saved) => saved,
            Err(err) => {
                self.logger.debug("StateUpdater", &format!("failed to save target {}: {err}", target.id));
                target
            }
        };

        let metric = Metric::new(saved.id, now, response_time_ms, reachable);
        if let Err(err) = self.metrics.save(metric).await {
            self.logger.debug("StateUpdater", &format!("failed to save metric for {}: {err}", saved.id));
        }

        if transitioned && saved.current_status == new_status {
            let event = CheckResult::new(saved.id, now, new_status, response_time_ms, error_message);
            if let Err(err) = self.check_results.save(event).await {
                self.logger.debug("StateUpdater", &format!("failed to save check result for {}: {err}", saved.id));
            }
            self.logger
                .state_change(saved.id, &saved.previous_status.to_string(), &saved.current_status.to_string(), response_time_ms);
        }

        StateUpdateOutcome {
            transitioned: transitioned && saved.current_status == new_status,
            target: saved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::domain::TargetType;
    use crate::engine::repository::memory::{InMemoryCheckResultRepository, InMemoryMetricRepository, InMemoryTargetRepository};
    use uuid::Uuid;

    fn updater() -> (StateUpdater, Arc<InMemoryTargetRepository>, Arc<InMemoryCheckResultRepository>) {
        let targets = Arc::new(InMemoryTargetRepository::new());
        let metrics = Arc::new(InMemoryMetricRepository::new());
        let check_results = Arc::new(InMemoryCheckResultRepository::new());
        let logger = Arc::new(EngineLogger::new());
        (
            StateUpdater::new(targets.clone(), metrics, check_results.clone(), logger),
            targets,
            check_results,
        )
    }

    #[tokio::test]
    async fn transition_writes_check_result_and_metric() {
        let (updater, _targets, check_results) = updater();
        let target = Target::new(Uuid::new_v4(), "t", "https://example.com", TargetType::Web);
        let now = chrono::Utc::now();

        let outcome = updater.update(target, TargetStatus::Up, 80, true, None, now).await;
        assert!(outcome.transitioned);
        assert_eq!(outcome.target.current_status, TargetStatus::Up);
        assert_eq!(outcome.target.previous_status, TargetStatus::Unknown);

        let events = check_results.list_by_target(outcome.target.id, 10).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn same_status_never_writes_check_result() {
        let (updater, _targets, check_results) = updater();
        let mut target = Target::new(Uuid::new_v4(), "t", "https://example.com", TargetType::Web);
        target.current_status = TargetStatus::Up;
        target.previous_status = TargetStatus::Up;
        let now = chrono::Utc::now();

        let outcome = updater.update(target, TargetStatus::Up, 80, true, None, now).await;
        assert!(!outcome.transitioned);
        let events = check_results.list_by_target(outcome.target.id, 10).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn next_check_at_follows_check_interval() {
        let (updater, _targets, _check_results) = updater();
        let target = Target::new(Uuid::new_v4(), "t", "https://example.com", TargetType::Web);
        let now = chrono::Utc::now();

        let outcome = updater.update(target, TargetStatus::Up, 80, true, None, now).await;
        let expected = now + chrono::Duration::seconds(300);
        assert_eq!(outcome.target.next_check_at, Some(expected));
    }
}
