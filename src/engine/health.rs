//! System health / uptime snapshot (SPEC_FULL §B), grounded on
//! `examples/original_source/.../infrastructure/self_diagnostics.go`'s
//! `SelfDiagnostics`/`SystemHealth`/`CheckHealth`. The Go original reads
//! `runtime.NumGoroutine()` and DB pool stats; this crate has no goroutine
//! count or DB pool to report, so the snapshot carries the two numbers that
//! are actually meaningful here: the worker pool's fixed size and the
//! scheduler's live in-flight count, plus the same uptime clock and
//! last-panic readout.

use crate::engine::diagnostics;
use crate::engine::pipeline::scheduler::InFlightSet;
use std::time::Instant;

/// A point-in-time read of the running engine. No HTTP surface exposes this
/// (out of scope per spec.md §1) — it is a plain method on the handle for
/// whatever embeds the core to poll.
#[derive(Debug, Clone)]
pub struct EngineHealth {
    pub uptime_secs: u64,
    pub worker_count: usize,
    pub in_flight_count: usize,
    pub last_panic: Option<diagnostics::PanicRecord>,
}

/// Owns the start-of-process clock, mirroring `SelfDiagnostics{db, start}`.
pub struct EngineHealthTracker {
    start: Instant,
    worker_count: usize,
}

impl EngineHealthTracker {
    pub fn new(worker_count: usize) -> Self {
        Self {
            start: Instant::now(),
            worker_count,
        }
    }

    pub fn snapshot(&self, in_flight: &InFlightSet) -> EngineHealth {
        EngineHealth {
            uptime_secs: self.start.elapsed().as_secs(),
            worker_count: self.worker_count,
            in_flight_count: in_flight.len(),
            last_panic: diagnostics::last_panic(),
        }
    }
}
