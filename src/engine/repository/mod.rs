//! External collaborator interfaces (spec.md §6). The core only depends on
//! these traits; concrete storage, the HTTP CRUD surface, auth, and
//! transports are out of scope per spec.md §1 and live behind whatever
//! adapter a deployment chooses. `memory` ships a reference in-process
//! implementation used by the CLI harness and the test suite.

pub mod memory;

use crate::engine::domain::{CheckResult, Metric, Target, TargetStatistics};
use crate::engine::error::EngineResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait TargetRepository: Send + Sync {
    async fn list_due(&self, now: chrono::DateTime<chrono::Utc>) -> EngineResult<Vec<Target>>;
    async fn save(&self, target: Target) -> EngineResult<Target>;
    async fn get_by_id(&self, id: Uuid) -> EngineResult<Target>;
}

#[async_trait]
pub trait MetricRepository: Send + Sync {
    async fn save(&self, metric: Metric) -> EngineResult<()>;
    async fn list_by_target(&self, target_id: Uuid, limit: usize) -> EngineResult<Vec<Metric>>;
}

#[async_trait]
pub trait CheckResultRepository: Send + Sync {
    async fn save(&self, result: CheckResult) -> EngineResult<CheckResult>;
    async fn list_by_target(&self, target_id: Uuid, limit: usize) -> EngineResult<Vec<CheckResult>>;
}

#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Lazily creates a zero row on miss, per spec.md §6.
    async fn get(&self, target_id: Uuid) -> EngineResult<TargetStatistics>;
    async fn save(&self, stats: TargetStatistics) -> EngineResult<()>;
}

#[async_trait]
pub trait NotificationChecker: Send + Sync {
    async fn has_active_channel(&self, user_id: Uuid) -> bool;
}

#[async_trait]
pub trait NotificationConsumer: Send + Sync {
    async fn deliver(&self, event: crate::engine::domain::AlertEvent);
}
