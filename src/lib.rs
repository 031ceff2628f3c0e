//! `ccmonitor`: a distributed uptime and latency monitoring engine.
//!
//! The monitoring pipeline lives under [`engine`]; everything outside it
//! (HTTP CRUD, auth, concrete notification transports, DB schema) is
//! deliberately out of scope and left to the deployments that embed this
//! crate, per the core's external-collaborator interfaces in
//! `engine::repository`.

pub mod engine;
