//! Shared primitives used across AgentGuard crates

mod error;
mod trace;

pub use error::HttpError;
pub use trace::TraceId;
