//! Audit trail for AgentGuard
//!
//! Builds immutable audit events, content-addresses request and response
//! payloads, and delivers events to a best-effort sink.

#![allow(clippy::must_use_candidate)]

mod event;
mod hash;
mod logger;

pub use event::{Event, EventBuilder, EventType};
pub use hash::hash_content;
pub use logger::{AuditLogger, JsonLogger, MemoryLogger};
