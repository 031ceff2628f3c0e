//! Stability Checker — "ping-to-stability" (spec.md §4.2). Runs up to
//! `N_MAX` probes, stopping as soon as the last three statuses agree.

use super::probe::{HttpClientTrait, ProbeEngine, ProbeResult};
use crate::engine::domain::TargetStatus;
use async_trait::async_trait;
use std::time::Duration;

/// Clock abstraction so stability tests never sleep for real, mirroring the
/// teacher's `ClockTrait` split in `http_monitor.rs`.
#[async_trait]
pub trait ClockTrait: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioClock;

#[async_trait]
impl ClockTrait for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Every probe taken during one session, plus whether it stabilized.
#[derive(Debug, Clone)]
pub struct Session {
    pub probes: Vec<ProbeResult>,
    pub stable: bool,
}

pub struct StabilityChecker<C: HttpClientTrait, K: ClockTrait> {
    probe_engine: ProbeEngine<C>,
    clock: K,
    n_max: u32,
    inter_probe_delay_ms: u64,
}

impl<C: HttpClientTrait, K: ClockTrait> StabilityChecker<C, K> {
    pub fn new(probe_engine: ProbeEngine<C>, clock: K, n_max: u32, inter_probe_delay_ms: u64) -> Self {
        Self {
            probe_engine,
            clock,
            n_max: n_max.max(1),
            inter_probe_delay_ms,
        }
    }

    /// Run the session against `url` with `timeout_seconds` per probe.
    pub async fn run(&self, url: &str, timeout_seconds: u32) -> Session {
        let mut probes = Vec::with_capacity(self.n_max as usize);

        for i in 0..self.n_max {
            probes.push(self.probe_engine.probe(url, timeout_seconds).await);

            if last_three_agree(&probes) {
                return Session { probes, stable: true };
            }

            if i + 1 < self.n_max {
                self.clock.sleep(Duration::from_millis(self.inter_probe_delay_ms)).await;
            }
        }

        Session { probes, stable: false }
    }
}

fn last_three_agree(probes: &[ProbeResult]) -> bool {
    if probes.len() < 3 {
        return false;
    }
    let tail = &probes[probes.len() - 3..];
    let first_status = tail[0].status;
    tail.iter().all(|p| p.status == first_status)
}
