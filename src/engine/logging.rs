//! Structured, size-rotating JSONL logging for the engine.
//!
//! This is a direct descendant of the teacher's `EnhancedDebugLogger` /
//! `RotatingLogger`: an always-on NDJSON operational log plus an optional
//! flat-text debug log gated by `CCMONITOR_DEBUG`, both written through a
//! `Mutex`-guarded rotating file writer (8 MB threshold, 5 gzip archives
//! kept), with a per-process session id for correlation and regex-based
//! redaction of anything secret-shaped.

use chrono::Local;
use flate2::{write::GzEncoder, Compression};
use fs2::FileExt;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

const LOG_ROTATION_SIZE_MB: u64 = 8;
const MAX_ARCHIVES: u32 = 5;
const ROTATION_CHECK_INTERVAL: u32 = 200;

struct RotatingLogger {
    log_path: PathBuf,
    write_count: AtomicU32,
}

impl RotatingLogger {
    fn new(log_path: PathBuf) -> Self {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        Self {
            log_path,
            write_count: AtomicU32::new(0),
        }
    }

    fn write_with_rotation(&self, line: &str) -> std::io::Result<()> {
        if self.write_count.fetch_add(1, Ordering::Relaxed) % ROTATION_CHECK_INTERVAL == 0 {
            let _ = self.rotate_if_needed();
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.needs_rotation()? {
            return Ok(());
        }

        let lock_path = self.log_path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => {
                if self.needs_rotation()? {
                    self.perform_rotation()?;
                }
                let _ = std::fs::remove_file(&lock_path);
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }

    fn needs_rotation(&self) -> std::io::Result<bool> {
        if !self.log_path.exists() {
            return Ok(false);
        }
        let metadata = std::fs::metadata(&self.log_path)?;
        Ok(metadata.len() >= LOG_ROTATION_SIZE_MB * 1024 * 1024)
    }

    fn perform_rotation(&self) -> std::io::Result<()> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = self
            .log_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("ccmonitor.log")
            .to_string();
        let archive_name = format!("{}.{}.gz", filename, timestamp);
        let archive_path = self
            .log_path
            .parent()
            .map(|p| p.join(&archive_name))
            .unwrap_or_else(|| PathBuf::from(&archive_name));

        let temp_path = self.log_path.with_extension("rotating");
        std::fs::rename(&self.log_path, &temp_path)?;

        let source_file = File::open(&temp_path)?;
        let target_file = File::create(&archive_path)?;
        let mut encoder = GzEncoder::new(target_file, Compression::default());
        std::io::copy(&mut BufReader::new(source_file), &mut encoder)?;
        encoder.finish()?;
        std::fs::remove_file(&temp_path)?;

        let _ = self.cleanup_old_archives(&filename);
        Ok(())
    }

    fn cleanup_old_archives(&self, filename: &str) -> std::io::Result<()> {
        let log_dir = match self.log_path.parent() {
            Some(p) => p,
            None => return Ok(()),
        };

        let mut archives = Vec::new();
        for entry in std::fs::read_dir(log_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&format!("{}.", filename)) && name.ends_with(".gz") {
                archives.push((entry.path(), entry.metadata()?.modified()?));
            }
        }

        archives.sort_by_key(|(_, modified)| *modified);
        if archives.len() > MAX_ARCHIVES as usize {
            let to_remove = archives.len() - MAX_ARCHIVES as usize;
            for (path, _) in archives.iter().take(to_remove) {
                let _ = std::fs::remove_file(path);
            }
        }
        Ok(())
    }
}

/// Where the engine's logs live and whether the flat debug log is active.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    pub jsonl_path: PathBuf,
    pub debug_log_path: PathBuf,
    pub debug_enabled: bool,
}

impl LoggerConfig {
    pub fn from_env() -> Self {
        let state_dir = Self::state_dir();
        Self {
            jsonl_path: state_dir.join("ccmonitor-events.jsonl"),
            debug_log_path: state_dir.join("ccmonitor-debug.log"),
            debug_enabled: parse_env_bool("CCMONITOR_DEBUG"),
        }
    }

    fn state_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("CCMONITOR_STATE_DIR") {
            return PathBuf::from(dir);
        }
        let mut dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        dir.push(".claude");
        dir.push("ccmonitor");
        dir
    }
}

/// Parse strict true/false (case-insensitive) environment booleans.
pub fn parse_env_bool(env_var: &str) -> bool {
    std::env::var(env_var)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// The engine's single logging facade: one JSONL event stream plus an
/// optional flat debug stream, both redacted before they hit disk.
pub struct EngineLogger {
    enabled_debug: bool,
    debug_logger: Option<Mutex<RotatingLogger>>,
    jsonl_logger: Mutex<RotatingLogger>,
    session_id: String,
    redaction_patterns: Vec<Regex>,
}

impl EngineLogger {
    pub fn new() -> Self {
        Self::from_config(LoggerConfig::from_env())
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        let session_id = Uuid::new_v4().to_string()[..8].to_string();
        let debug_logger = config
            .debug_enabled
            .then(|| Mutex::new(RotatingLogger::new(config.debug_log_path)));
        let jsonl_logger = Mutex::new(RotatingLogger::new(config.jsonl_path));

        Self {
            enabled_debug: config.debug_enabled,
            debug_logger,
            jsonl_logger,
            session_id,
            redaction_patterns: compile_redaction_patterns(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn redact(&self, text: &str) -> String {
        let mut redacted = text.to_string();
        for pattern in &self.redaction_patterns {
            redacted = pattern.replace_all(&redacted, "[REDACTED]").to_string();
        }
        redacted
    }

    /// Write a structured event to the always-on JSONL stream.
    pub fn event(&self, component: &str, kind: &str, mut fields: HashMap<String, serde_json::Value>) {
        if let Some(message) = fields.get("message").and_then(|m| m.as_str()).map(str::to_owned) {
            fields.insert("message".to_string(), serde_json::Value::String(self.redact(&message)));
        }

        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            component: component.to_string(),
            event: kind.to_string(),
            session_id: self.session_id.clone(),
            fields,
        };

        if let (Ok(json_line), Ok(logger)) = (serde_json::to_string(&entry), self.jsonl_logger.lock()) {
            let _ = logger.write_with_rotation(&json_line);
        }
    }

    /// Flat human-readable line, only emitted when `CCMONITOR_DEBUG=true`.
    pub fn debug(&self, component: &str, message: &str) {
        if !self.enabled_debug {
            return;
        }
        let line = format!(
            "{} [{}] {}",
            Local::now().to_rfc3339(),
            component,
            self.redact(message)
        );
        if let Some(logger) = &self.debug_logger {
            if let Ok(logger) = logger.lock() {
                let _ = logger.write_with_rotation(&line);
            }
        }
    }

    pub fn probe_start(&self, target_id: uuid::Uuid, mode: &str) {
        let mut fields = HashMap::new();
        fields.insert("target_id".into(), serde_json::Value::String(target_id.to_string()));
        fields.insert("mode".into(), serde_json::Value::String(mode.to_string()));
        self.event("ProbeEngine", "probe_start", fields);
    }

    pub fn state_change(&self, target_id: uuid::Uuid, from: &str, to: &str, avg_ms: u32) {
        let mut fields = HashMap::new();
        fields.insert("target_id".into(), serde_json::Value::String(target_id.to_string()));
        fields.insert("from".into(), serde_json::Value::String(from.to_string()));
        fields.insert("to".into(), serde_json::Value::String(to.to_string()));
        fields.insert("avg_response_time_ms".into(), serde_json::Value::from(avg_ms));
        self.event("StateUpdater", "state_change", fields);
    }

    pub fn worker_panic(&self, target_id: uuid::Uuid, message: &str) {
        let mut fields = HashMap::new();
        fields.insert("target_id".into(), serde_json::Value::String(target_id.to_string()));
        fields.insert("message".into(), serde_json::Value::String(message.to_string()));
        self.event("WorkerPool", "panic_caught", fields);
    }

    pub fn self_down(&self, reason: &str) {
        let mut fields = HashMap::new();
        fields.insert("message".into(), serde_json::Value::String(reason.to_string()));
        self.event("PollingScheduler", "self_down", fields);
    }
}

impl Default for EngineLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct LogEntry {
    timestamp: String,
    component: String,
    event: String,
    session_id: String,
    fields: HashMap<String, serde_json::Value>,
}

fn compile_redaction_patterns() -> Vec<Regex> {
    let patterns = [
        r"(?i)authorization[:\s]+[^\s\n]+",
        r"(?i)bearer[:\s]+[^\s\n]+",
        r"(?i)token[:\s]+[^\s\n]+",
        r"(?i)password[:\s]+[^\s\n]+",
        r"(?i)api[_-]?key[:\s]+[^\s\n]+",
        r"(?i)secret[:\s]+[^\s\n]+",
    ];
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_bearer_tokens() {
        let logger = EngineLogger::from_config(LoggerConfig {
            jsonl_path: std::env::temp_dir().join("ccmonitor-test.jsonl"),
            debug_log_path: std::env::temp_dir().join("ccmonitor-test-debug.log"),
            debug_enabled: false,
        });
        let redacted = logger.redact("Authorization: Bearer sk-abcdef123456");
        assert!(!redacted.contains("sk-abcdef123456"));
    }

    #[test]
    fn parses_strict_bool() {
        std::env::set_var("CCMONITOR_TEST_BOOL", "true");
        assert!(parse_env_bool("CCMONITOR_TEST_BOOL"));
        std::env::set_var("CCMONITOR_TEST_BOOL", "yes");
        assert!(!parse_env_bool("CCMONITOR_TEST_BOOL"));
        std::env::remove_var("CCMONITOR_TEST_BOOL");
    }
}
