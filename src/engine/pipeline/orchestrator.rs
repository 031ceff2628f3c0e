//! Orchestrator (spec.md §4.9): the canonical per-target pipeline driver.
//! Owns every pipeline component and composes them in the order
//! Probe→Stability→Metrics→(read baseline)→Analyzer→StateUpdater→
//! (write baseline)→Dispatcher.

use super::analyzer;
use super::metrics;
use super::probe::{HttpClientTrait, ProbeEngine};
use super::stability::{ClockTrait, StabilityChecker};
use super::state_updater::StateUpdater;
use super::statistics_engine::StatisticsEngine;
use crate::engine::config::EngineConfig;
use crate::engine::domain::{AlertEvent, AlertType, SeverityMapper};
use crate::engine::logging::EngineLogger;
use crate::engine::pipeline::dispatcher::AlertDispatcher;
use crate::engine::repository::NotificationChecker;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Invoked once processing for a target id has fully completed, so the
/// scheduler can clear it from its `in_flight` set (spec.md §4.9 step 6,
/// §4.10 point 3). A plain callback value — breaks the scheduler/orchestrator
/// cyclic reference per design note §9.
pub type OnProcessingComplete = Arc<dyn Fn(Uuid) + Send + Sync>;

pub struct Orchestrator<C: HttpClientTrait, K: ClockTrait> {
    stability_checker: StabilityChecker<C, K>,
    state_updater: StateUpdater,
    statistics_engine: StatisticsEngine,
    dispatcher: Arc<AlertDispatcher>,
    severity_mapper: SeverityMapper,
    notification_checker: Arc<dyn NotificationChecker>,
    config: EngineConfig,
    logger: Arc<EngineLogger>,
    on_complete: OnProcessingComplete,
}

impl<C: HttpClientTrait, K: ClockTrait> Orchestrator<C, K> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        http_client: C,
        clock: K,
        state_updater: StateUpdater,
        statistics_engine: StatisticsEngine,
        dispatcher: Arc<AlertDispatcher>,
        notification_checker: Arc<dyn NotificationChecker>,
        config: EngineConfig,
        logger: Arc<EngineLogger>,
        on_complete: OnProcessingComplete,
    ) -> Self {
        let n_max = config.n_max_probes;
        let delay = config.inter_probe_delay_ms;
        Self {
            stability_checker: StabilityChecker::new(ProbeEngine::new(http_client), clock, n_max, delay),
            state_updater,
            statistics_engine,
            dispatcher,
            severity_mapper: SeverityMapper::new(),
            notification_checker,
            config,
            logger,
            on_complete,
        }
    }

    /// `processTarget(t)` — the canonical pipeline (spec.md §4.2-§4.7, then
    /// §4.9's baseline-write and alert-fanout steps).
    pub async fn process(&self, target: crate::engine::domain::Target) {
        let target_id = target.id;
        self.logger.probe_start(target_id, "session");

        let session = self.stability_checker.run(&target.url, target.configuration.timeout_seconds).await;
        let session_metrics = metrics::calculate(&session);

        let historical = self
            .statistics_engine
            .baseline_for(target_id)
            .await
            .unwrap_or_else(|_| crate::engine::domain::TargetStatistics::new(target_id));

        let new_status = analyzer::analyze(&session, &session_metrics, &historical, self.config.min_latency_threshold_ms);

        let error_message = session.probes.last().and_then(|p| p.error_message.clone());
        let reachable = session.probes.last().map(|p| p.reachable).unwrap_or(false);
        let previous_status = target.current_status;
        let owner_user_id = target.owner_user_id;

        let outcome = self
            .state_updater
            .update(target, new_status, session_metrics.avg_response_time_ms, reachable, error_message, chrono::Utc::now())
            .await;

        // Orchestrator step 1-3: compute maxChecks, gate on total_checks <= 4,
        // fold and save the baseline.
        let check_interval = outcome.target.configuration.check_interval_seconds;
        if session_metrics.total_checks <= 4 {
            let _ = self
                .statistics_engine
                .record_sample(target_id, session_metrics.avg_response_time_ms, check_interval, &self.config)
                .await;
        }

        // Orchestrator step 4: alert fanout gated on an active channel.
        if self.notification_checker.has_active_channel(owner_user_id).await {
            let severity = self.severity_mapper.map(outcome.target.current_status);
            let previous_severity = self.severity_mapper.map(previous_status);

            let event = AlertEvent::new(
                owner_user_id,
                outcome.target.name.clone(),
                format!("{} is now {}", outcome.target.name, outcome.target.current_status),
                severity,
                previous_severity,
                format!("Target: {}", outcome.target.name),
                AlertType::Monitoring,
                HashMap::new(),
            );

            if event.should_notify() {
                self.dispatcher.dispatch(event).await;
            }
        }

        // Orchestrator step 6.
        (self.on_complete)(target_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::domain::TargetType;
    use crate::engine::logging::EngineLogger;
    use crate::engine::pipeline::stability::ClockTrait;
    use crate::engine::repository::memory::{
        AlwaysActiveNotificationChecker, InMemoryCheckResultRepository, InMemoryMetricRepository, InMemoryStatisticsRepository, InMemoryTargetRepository,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct AlwaysUpClient;

    #[async_trait]
    impl HttpClientTrait for AlwaysUpClient {
        async fn get(&self, _url: &str, _timeout_ms: u64) -> Result<u16, String> {
            Ok(200)
        }
    }

    struct InstantClock;

    #[async_trait]
    impl ClockTrait for InstantClock {
        async fn sleep(&self, _duration: Duration) {}
    }

    #[tokio::test]
    async fn clean_bring_up_dispatches_an_ok_alert() {
        let targets = Arc::new(InMemoryTargetRepository::new());
        let metrics_repo = Arc::new(InMemoryMetricRepository::new());
        let check_results = Arc::new(InMemoryCheckResultRepository::new());
        let stats_repo = Arc::new(InMemoryStatisticsRepository::new());
        let logger = Arc::new(EngineLogger::new());

        let delivered = Arc::new(AtomicUsize::new(0));
        struct CountingConsumer(Arc<AtomicUsize>);
        #[async_trait]
        impl crate::engine::repository::NotificationConsumer for CountingConsumer {
            async fn deliver(&self, _event: AlertEvent) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
        let dispatcher = Arc::new(AlertDispatcher::start(10, Arc::new(CountingConsumer(delivered.clone()))));

        let state_updater = StateUpdater::new(targets.clone(), metrics_repo, check_results.clone(), logger.clone());
        let statistics_engine = StatisticsEngine::new(stats_repo);
        let config = EngineConfig::default();

        let completed = Arc::new(AtomicUsize::new(0));
        let on_complete: OnProcessingComplete = {
            let completed = completed.clone();
            Arc::new(move |_id: Uuid| {
                completed.fetch_add(1, Ordering::SeqCst);
            })
        };

        let orchestrator = Orchestrator::new(
            AlwaysUpClient,
            InstantClock,
            state_updater,
            statistics_engine,
            dispatcher,
            Arc::new(AlwaysActiveNotificationChecker),
            config,
            logger,
            on_complete,
        );

        let target = Target::new(Uuid::new_v4(), "api", "https://example.com", TargetType::Api);
        let target_id = target.id;
        orchestrator.process(target).await;

        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        assert_eq!(completed.load(Ordering::SeqCst), 1);

        let events = check_results.list_by_target(target_id, 10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, crate::engine::domain::TargetStatus::Up);
    }
}
