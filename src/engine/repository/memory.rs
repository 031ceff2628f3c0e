//! In-process reference repositories. Used by the CLI harness (spec.md §A.4
//! explicitly keeps the HTTP/DB surface out of scope) and by tests. Each is a
//! `std::sync::Mutex`-guarded `HashMap`, sufficient for the core's actual
//! concurrency contract: exactly one writer per target at a time, enforced
//! by the scheduler's in-flight set (spec.md §5), not by these stores.

use super::{CheckResultRepository, MetricRepository, NotificationChecker, StatisticsRepository, TargetRepository};
use crate::engine::domain::{CheckResult, Metric, Target, TargetStatistics};
use crate::engine::error::{EngineError, EngineResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryTargetRepository {
    targets: Mutex<HashMap<Uuid, Target>>,
}

impl InMemoryTargetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, targets: Vec<Target>) {
        let mut guard = self.targets.lock().unwrap();
        for target in targets {
            guard.insert(target.id, target);
        }
    }
}

#[async_trait]
impl TargetRepository for InMemoryTargetRepository {
    async fn list_due(&self, now: chrono::DateTime<chrono::Utc>) -> EngineResult<Vec<Target>> {
        let guard = self.targets.lock().unwrap();
        Ok(guard.values().filter(|t| t.is_due(now)).cloned().collect())
    }

    async fn save(&self, target: Target) -> EngineResult<Target> {
        let mut guard = self.targets.lock().unwrap();
        guard.insert(target.id, target.clone());
        Ok(target)
    }

    async fn get_by_id(&self, id: Uuid) -> EngineResult<Target> {
        let guard = self.targets.lock().unwrap();
        guard.get(&id).cloned().ok_or(EngineError::NotFound(id))
    }
}

#[derive(Default)]
pub struct InMemoryMetricRepository {
    metrics: Mutex<Vec<Metric>>,
}

impl InMemoryMetricRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetricRepository for InMemoryMetricRepository {
    async fn save(&self, metric: Metric) -> EngineResult<()> {
        self.metrics.lock().unwrap().push(metric);
        Ok(())
    }

    async fn list_by_target(&self, target_id: Uuid, limit: usize) -> EngineResult<Vec<Metric>> {
        let guard = self.metrics.lock().unwrap();
        let mut matching: Vec<Metric> = guard.iter().filter(|m| m.target_id == target_id).cloned().collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }
}

#[derive(Default)]
pub struct InMemoryCheckResultRepository {
    results: Mutex<Vec<CheckResult>>,
}

impl InMemoryCheckResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckResultRepository for InMemoryCheckResultRepository {
    async fn save(&self, result: CheckResult) -> EngineResult<CheckResult> {
        self.results.lock().unwrap().push(result.clone());
        Ok(result)
    }

    async fn list_by_target(&self, target_id: Uuid, limit: usize) -> EngineResult<Vec<CheckResult>> {
        let guard = self.results.lock().unwrap();
        let mut matching: Vec<CheckResult> = guard.iter().filter(|r| r.target_id == target_id).cloned().collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }
}

#[derive(Default)]
pub struct InMemoryStatisticsRepository {
    stats: Mutex<HashMap<Uuid, TargetStatistics>>,
}

impl InMemoryStatisticsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatisticsRepository for InMemoryStatisticsRepository {
    async fn get(&self, target_id: Uuid) -> EngineResult<TargetStatistics> {
        let guard = self.stats.lock().unwrap();
        Ok(guard.get(&target_id).cloned().unwrap_or_else(|| TargetStatistics::new(target_id)))
    }

    async fn save(&self, stats: TargetStatistics) -> EngineResult<()> {
        self.stats.lock().unwrap().insert(stats.target_id, stats);
        Ok(())
    }
}

/// Every owner has an active channel — useful for tests and single-tenant
/// deployments that don't wire up a real notification service.
pub struct AlwaysActiveNotificationChecker;

#[async_trait]
impl NotificationChecker for AlwaysActiveNotificationChecker {
    async fn has_active_channel(&self, _user_id: Uuid) -> bool {
        true
    }
}

/// Only the listed user ids have an active channel.
pub struct AllowListNotificationChecker {
    active_users: HashSet<Uuid>,
}

impl AllowListNotificationChecker {
    pub fn new(active_users: HashSet<Uuid>) -> Self {
        Self { active_users }
    }
}

#[async_trait]
impl NotificationChecker for AllowListNotificationChecker {
    async fn has_active_channel(&self, user_id: Uuid) -> bool {
        self.active_users.contains(&user_id)
    }
}
