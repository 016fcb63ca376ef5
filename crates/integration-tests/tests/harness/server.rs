//! Test server wrapper that starts AgentGuard on a random port

use std::net::SocketAddr;
use std::sync::Arc;

use agentguard_audit::{Event, MemoryLogger};
use agentguard_config::Config;
use agentguard_server::Server;
use tokio_util::sync::CancellationToken;

/// A running gateway with an in-memory audit trail
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    audit: Arc<MemoryLogger>,
}

impl TestServer {
    /// Start a gateway with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let audit = Arc::new(MemoryLogger::new());
        let server = Server::with_audit_logger(config, audit.clone()).await?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
            audit,
        })
    }

    /// Absolute URL for a path on the gateway
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST a raw body to the chat completion endpoint
    pub async fn chat(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(self.url("/v1/chat/completions"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("gateway reachable")
    }

    /// Audit events emitted so far
    pub fn events(&self) -> Vec<Event> {
        self.audit.events()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
