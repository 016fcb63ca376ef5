use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// AgentGuard LLM gateway
#[derive(Debug, Parser)]
#[command(name = "agentguard", about = "Policy-enforcing, audited reverse proxy for LLM APIs")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "agentguard.toml", env = "AGENTGUARD_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "AGENTGUARD_LISTEN")]
    pub listen: Option<SocketAddr>,
}
