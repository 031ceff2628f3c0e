//! Error taxonomy for the monitoring engine.
//!
//! Mirrors the kinds (not type names) from the design's error-handling
//! section: probe failures and storage failures are absorbed deep in the
//! pipeline and never reach here as panics, but the components that can
//! genuinely fail to do their job (state transition validation, repository
//! I/O, config loading) report a typed `EngineError` so callers can log it
//! with context instead of guessing from a string.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: crate::engine::domain::target::TargetStatus,
        to: crate::engine::domain::target::TargetStatus,
    },

    #[error("storage error for target {target_id}: {source}")]
    Storage {
        target_id: uuid::Uuid,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("target not found: {0}")]
    NotFound(uuid::Uuid),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("self-connectivity check failed: {0}")]
    SelfDown(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
