#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod provider;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use agentguard_policy::{PolicyConfig, RuleSet};
pub use provider::*;
pub use server::*;
pub use telemetry::TelemetryConfig;

/// Top-level AgentGuard configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream LLM provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Model and tool policy rules
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
