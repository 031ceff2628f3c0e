//! Engine-wide tunables (spec.md §6 "Configuration surface").
//!
//! Loaded the way the teacher loads its own settings: a `toml` file on disk
//! (optional) overlaid with environment variables, env taking precedence so
//! operators can override a single knob without editing the file. Everything
//! outside this surface (DB DSN, transport credentials, notification
//! provider secrets) belongs to collaborators, per spec.md §6.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tick_interval_secs: u64,
    pub n_max_probes: u32,
    pub inter_probe_delay_ms: u64,
    pub min_latency_threshold_ms: u32,
    pub window_days: u32,
    pub worker_count: usize,
    pub buffer_size: usize,
    pub alert_buffer_size: usize,
    pub skip_connectivity_check: bool,
    pub connectivity_check_host: String,
    pub connectivity_check_timeout_ms: u64,
    pub state_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 10,
            n_max_probes: 12,
            inter_probe_delay_ms: 30,
            min_latency_threshold_ms: 200,
            window_days: 7,
            worker_count: 10,
            buffer_size: 100,
            alert_buffer_size: 100,
            skip_connectivity_check: false,
            connectivity_check_host: "1.1.1.1:443".to_string(),
            connectivity_check_timeout_ms: 2000,
            state_dir: default_state_dir(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    let mut dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push(".claude");
    dir.push("ccmonitor");
    dir
}

impl EngineConfig {
    /// Load optional `path` as TOML, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> crate::engine::error::EngineResult<Self> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let contents = std::fs::read_to_string(p)?;
                toml::from_str(&contents)?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_u64("CCMONITOR_TICK_INTERVAL_SECS") {
            self.tick_interval_secs = v;
        }
        if let Some(v) = env_u32("CCMONITOR_N_MAX") {
            self.n_max_probes = v;
        }
        if let Some(v) = env_u64("CCMONITOR_INTER_PROBE_DELAY_MS") {
            self.inter_probe_delay_ms = v;
        }
        if let Some(v) = env_u32("CCMONITOR_MIN_LATENCY_THRESHOLD_MS") {
            self.min_latency_threshold_ms = v;
        }
        if let Some(v) = env_u32("CCMONITOR_WINDOW_DAYS") {
            self.window_days = v;
        }
        if let Some(v) = env_usize("CCMONITOR_WORKER_COUNT") {
            self.worker_count = v;
        }
        if let Some(v) = env_usize("CCMONITOR_BUFFER_SIZE") {
            self.buffer_size = v;
        }
        if let Some(v) = env_usize("CCMONITOR_ALERT_BUFFER_SIZE") {
            self.alert_buffer_size = v;
        }
        if crate::engine::logging::parse_env_bool("CCMONITOR_SKIP_CONNECTIVITY_CHECK") {
            self.skip_connectivity_check = true;
        }
        if let Ok(host) = std::env::var("CCMONITOR_CONNECTIVITY_HOST") {
            self.connectivity_check_host = host;
        }
        if let Some(v) = env_u64("CCMONITOR_CONNECTIVITY_TIMEOUT_MS") {
            self.connectivity_check_timeout_ms = v;
        }
    }

    /// `maxChecks` window size for a given check interval, per spec.md §4.5.
    pub fn max_checks_for_interval(&self, check_interval_secs: u32) -> u32 {
        let interval = if check_interval_secs == 0 { 300 } else { check_interval_secs };
        ((self.window_days as u64 * 86_400) / interval as u64) as u32
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_match_spec() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_interval_secs, 10);
        assert_eq!(config.n_max_probes, 12);
        assert_eq!(config.inter_probe_delay_ms, 30);
        assert_eq!(config.min_latency_threshold_ms, 200);
        assert_eq!(config.window_days, 7);
        assert_eq!(config.worker_count, 10);
        assert_eq!(config.buffer_size, 100);
    }

    #[test]
    fn max_checks_defaults_interval_to_300() {
        let config = EngineConfig::default();
        assert_eq!(config.max_checks_for_interval(0), config.max_checks_for_interval(300));
    }

    #[test]
    fn max_checks_for_300s_interval_is_about_2016() {
        let config = EngineConfig::default();
        assert_eq!(config.max_checks_for_interval(300), 2016);
    }

    #[test]
    #[serial]
    fn load_overlays_env_var_onto_a_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ccmonitor.toml");
        std::fs::write(&path, "worker_count = 4\nbuffer_size = 50\n").unwrap();

        std::env::set_var("CCMONITOR_WORKER_COUNT", "7");
        let config = EngineConfig::load(Some(&path)).unwrap();
        std::env::remove_var("CCMONITOR_WORKER_COUNT");

        assert_eq!(config.buffer_size, 50, "value from the file survives untouched");
        assert_eq!(config.worker_count, 7, "env var overrides the file");
    }

    #[test]
    fn load_with_missing_path_falls_back_to_defaults() {
        let config = EngineConfig::load(Some(std::path::Path::new("/nonexistent/ccmonitor.toml"))).unwrap();
        assert_eq!(config.worker_count, EngineConfig::default().worker_count);
    }
}
