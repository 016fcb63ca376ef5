//! Composition root: wires configuration into a running gateway

mod health;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agentguard_audit::{AuditLogger, JsonLogger};
use agentguard_config::Config;
use agentguard_llm::{Flow, ProviderRegistry};
use agentguard_policy::PolicyEngine;
use axum::Router;
use tokio::io::Stdout;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// How long `serve` waits for queued audit records after shutdown
const AUDIT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    audit_writer: Option<JoinHandle<Stdout>>,
}

impl Server {
    /// Build the server from configuration, auditing to standard output
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or the provider
    /// cannot be constructed
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (audit, writer) = JsonLogger::stdout();
        let mut server = Self::with_audit_logger(config, Arc::new(audit)).await?;
        server.audit_writer = Some(writer);

        Ok(server)
    }

    /// Build the server with a caller-supplied audit sink
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or the provider
    /// cannot be constructed
    pub async fn with_audit_logger(config: Config, audit: Arc<dyn AuditLogger>) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .ok_or_else(|| anyhow::anyhow!("server.listen_address is required"))?;

        let provider = ProviderRegistry::builtin().create(&config.provider).await?;
        let policy = Arc::new(PolicyEngine::new(&config.policy));
        let flow = Arc::new(Flow::new(provider, policy, audit));

        let router = Router::new()
            .route("/health", axum::routing::get(health::health_handler))
            .merge(agentguard_llm::llm_router(flow))
            .layer(TraceLayer::new_for_http());

        Ok(Self {
            router,
            listen_address,
            audit_writer: None,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered. In-flight requests
    /// are allowed to finish, then queued audit records are flushed.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let Self {
            router,
            listen_address,
            audit_writer,
        } = self;

        let listener = tokio::net::TcpListener::bind(listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        if let Some(writer) = audit_writer {
            match tokio::time::timeout(AUDIT_FLUSH_TIMEOUT, writer).await {
                Ok(Ok(_)) => tracing::debug!("audit trail flushed"),
                Ok(Err(e)) => tracing::warn!(error = %e, "audit writer task failed"),
                Err(_) => tracing::warn!("timed out flushing audit trail"),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use agentguard_audit::MemoryLogger;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    const CONFIG: &str = r#"
        [server]
        listen_address = "127.0.0.1:0"

        [provider]
        type = "openai"
        base_url = "http://127.0.0.1:1"

        [policy.models]
        allow = ["gpt-4o"]
    "#;

    async fn server(logger: Arc<MemoryLogger>) -> Server {
        Server::with_audit_logger(Config::parse(CONFIG).unwrap(), logger)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let router = server(Arc::new(MemoryLogger::new())).await.into_router();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn chat_route_rejects_get() {
        let router = server(Arc::new(MemoryLogger::new())).await.into_router();

        let response = router
            .oneshot(Request::get("/v1/chat/completions").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_before_audit() {
        let logger = Arc::new(MemoryLogger::new());
        let router = server(logger.clone()).await.into_router();

        let response = router
            .oneshot(
                Request::post("/v1/chat/completions")
                    .body(Body::from(r#"{"model":"gpt-4o","messages":[]} trailing"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(logger.events().is_empty());
    }

    #[tokio::test]
    async fn serve_returns_after_cancellation() {
        let server = Server::new(Config::parse(CONFIG).unwrap()).await.unwrap();
        let shutdown = tokio_util::sync::CancellationToken::new();
        shutdown.cancel();

        tokio::time::timeout(std::time::Duration::from_secs(10), server.serve(shutdown))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn unsupported_provider_fails_startup() {
        let mut config = Config::parse(CONFIG).unwrap();
        config.provider.provider_type = "azure".to_owned();

        let err = Server::with_audit_logger(config, Arc::new(MemoryLogger::new()))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("unsupported provider type: azure"));
    }
}
