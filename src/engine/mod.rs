//! Distributed uptime and latency monitoring engine (spec.md §1-§9).
//!
//! `domain` holds the data model and pure math, `repository` the external
//! collaborator traits (plus an in-memory reference implementation),
//! `pipeline` the actual monitoring components, and `config`/`logging`/
//! `error`/`diagnostics`/`notify` the ambient stack every component leans on.

pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod health;
pub mod logging;
pub mod notify;
pub mod pipeline;
pub mod repository;
