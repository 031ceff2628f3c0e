//! Probe Engine (spec.md §4.1): one HTTP GET, classified into a single
//! result. Dependency-injected HTTP client, mirroring the teacher's
//! `HttpClientTrait`/`IsahcHttpClient` split in `http_monitor.rs` so tests
//! never touch the network.

use crate::engine::domain::TargetStatus;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// One raw observation.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub status: TargetStatus,
    pub reachable: bool,
    pub response_time_ms: u32,
    pub error_message: Option<String>,
}

/// HTTP client abstraction for dependency injection and testing.
#[async_trait]
pub trait HttpClientTrait: Send + Sync {
    /// Execute a GET against `url` with `timeout_ms`. Returns the status
    /// code on a completed exchange, or `Err(cause)` for any transport-level
    /// failure (timeout, DNS, TCP reset). Elapsed time is measured by the
    /// caller (`ProbeEngine::probe`) around this call so it covers both
    /// outcomes, including a timed-out request.
    async fn get(&self, url: &str, timeout_ms: u64) -> Result<u16, String>;
}

/// Production client using `isahc`.
pub struct IsahcHttpClient {
    client: isahc::HttpClient,
}

impl IsahcHttpClient {
    pub fn new() -> Self {
        Self {
            client: isahc::HttpClient::new().expect("failed to build isahc client"),
        }
    }
}

impl Default for IsahcHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for IsahcHttpClient {
    async fn get(&self, url: &str, timeout_ms: u64) -> Result<u16, String> {
        use isahc::config::Configurable;

        let request = isahc::Request::get(url)
            .timeout(Duration::from_millis(timeout_ms))
            .body(())
            .map_err(|e| e.to_string())?;

        let response = self.client.send_async(request).await.map_err(|e| e.to_string())?;
        Ok(response.status().as_u16())
    }
}

pub struct ProbeEngine<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> ProbeEngine<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Execute a single probe against `url` with `timeout_seconds` (spec.md
    /// §4.1). No retries here — retries are multiple probes, handled one
    /// level up by the Stability Checker. Elapsed is measured around the
    /// whole call, including connection setup, so a transport error (timeout,
    /// DNS, TCP reset) still records a real latency observation (spec.md §4.3).
    pub async fn probe(&self, url: &str, timeout_seconds: u32) -> ProbeResult {
        let timeout_ms = (timeout_seconds as u64) * 1000;

        let start = Instant::now();
        let outcome = self.client.get(url, timeout_ms).await;
        let response_time_ms = start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;

        match outcome {
            Err(cause) => ProbeResult {
                status: TargetStatus::Down,
                reachable: false,
                response_time_ms,
                error_message: Some(cause),
            },
            Ok(status_code) => {
                let status = classify(status_code);
                ProbeResult {
                    reachable: status != TargetStatus::Down,
                    status,
                    response_time_ms,
                    error_message: None,
                }
            }
        }
    }
}

/// HTTP status -> TargetStatus per spec.md §4.1.
fn classify(status_code: u16) -> TargetStatus {
    match status_code {
        200..=299 => TargetStatus::Up,
        500..=599 => TargetStatus::Down,
        _ => TargetStatus::Degraded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Replies with a scripted status/error after an optional simulated
    /// delay, so tests can observe that `ProbeEngine::probe` measures real
    /// elapsed time around the call rather than trusting the client.
    struct ScriptedClient {
        responses: Vec<(Duration, Result<u16, String>)>,
        call_count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl HttpClientTrait for ScriptedClient {
        async fn get(&self, _url: &str, _timeout_ms: u64) -> Result<u16, String> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            let (delay, outcome) = self.responses[idx.min(self.responses.len() - 1)].clone();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome
        }
    }

    #[tokio::test]
    async fn classifies_2xx_as_up() {
        let engine = ProbeEngine::new(ScriptedClient {
            responses: vec![(Duration::ZERO, Ok(200))],
            call_count: Arc::new(AtomicUsize::new(0)),
        });
        let result = engine.probe("https://example.com", 10).await;
        assert_eq!(result.status, TargetStatus::Up);
        assert!(result.reachable);
    }

    #[tokio::test]
    async fn classifies_5xx_as_down() {
        let engine = ProbeEngine::new(ScriptedClient {
            responses: vec![(Duration::ZERO, Ok(503))],
            call_count: Arc::new(AtomicUsize::new(0)),
        });
        let result = engine.probe("https://example.com", 10).await;
        assert_eq!(result.status, TargetStatus::Down);
        assert!(!result.reachable);
    }

    #[tokio::test]
    async fn classifies_4xx_as_degraded() {
        let engine = ProbeEngine::new(ScriptedClient {
            responses: vec![(Duration::ZERO, Ok(404))],
            call_count: Arc::new(AtomicUsize::new(0)),
        });
        let result = engine.probe("https://example.com", 10).await;
        assert_eq!(result.status, TargetStatus::Degraded);
        assert!(result.reachable);
    }

    #[tokio::test]
    async fn classifies_3xx_as_degraded() {
        let engine = ProbeEngine::new(ScriptedClient {
            responses: vec![(Duration::ZERO, Ok(301))],
            call_count: Arc::new(AtomicUsize::new(0)),
        });
        let result = engine.probe("https://example.com", 10).await;
        assert_eq!(result.status, TargetStatus::Degraded);
    }

    #[tokio::test]
    async fn transport_error_is_down_and_unreachable() {
        let engine = ProbeEngine::new(ScriptedClient {
            responses: vec![(Duration::ZERO, Err("connection refused".to_string()))],
            call_count: Arc::new(AtomicUsize::new(0)),
        });
        let result = engine.probe("https://example.com", 10).await;
        assert_eq!(result.status, TargetStatus::Down);
        assert!(!result.reachable);
        assert_eq!(result.error_message.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn a_slow_transport_error_still_records_real_elapsed_time() {
        // A timeout after 40ms must not collapse to 0ms — §4.3's
        // max_response_time_ms only means something if failures carry a
        // real latency observation.
        let engine = ProbeEngine::new(ScriptedClient {
            responses: vec![(Duration::from_millis(40), Err("timed out".to_string()))],
            call_count: Arc::new(AtomicUsize::new(0)),
        });
        let result = engine.probe("https://example.com", 10).await;
        assert_eq!(result.status, TargetStatus::Down);
        assert!(result.response_time_ms >= 40, "response_time_ms was {}", result.response_time_ms);
    }
}
