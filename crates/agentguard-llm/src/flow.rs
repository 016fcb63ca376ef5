//! Per-request orchestration: audit, policy, upstream call, tool inspection

use std::fmt;
use std::sync::Arc;

use agentguard_audit::{AuditLogger, Event, EventType, hash_content};
use agentguard_core::TraceId;
use agentguard_policy::PolicyEngine;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use http::{HeaderMap, StatusCode};
use tracing::Instrument;

use crate::error::LlmError;
use crate::provider::Provider;
use crate::types::{CompletionRequest, CompletionResponse};

/// Upstream body handed back to the caller
pub enum FlowBody {
    /// Fully read body of a non-streaming response
    Buffered(Bytes),
    /// Live upstream body, not yet consumed
    Streaming(BoxStream<'static, Result<Bytes, reqwest::Error>>),
}

impl fmt::Debug for FlowBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Streaming(_) => f.write_str("Streaming"),
        }
    }
}

/// The upstream's status, headers and body, unmodified
#[derive(Debug)]
pub struct FlowResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: FlowBody,
}

/// Gateway pipeline for one configured provider
///
/// Holds no per-request state. The policy engine and audit sink are shared
/// read-only between concurrent requests.
pub struct Flow {
    provider: Arc<dyn Provider>,
    policy: Arc<PolicyEngine>,
    audit: Arc<dyn AuditLogger>,
    client: reqwest::Client,
}

impl Flow {
    pub fn new(provider: Arc<dyn Provider>, policy: Arc<PolicyEngine>, audit: Arc<dyn AuditLogger>) -> Self {
        Self {
            provider,
            policy,
            audit,
            client: reqwest::Client::new(),
        }
    }

    /// Run one request through the pipeline
    ///
    /// Emits `llm_request` and the model `policy_decision` before anything
    /// else. A denied model stops here. Otherwise the upstream is called
    /// exactly once and its response returned as-is. For buffered responses
    /// every proposed tool call is audited and evaluated, but a tool deny
    /// never alters the response.
    pub async fn process(&self, request: CompletionRequest) -> Result<FlowResponse, LlmError> {
        let trace_id = TraceId::generate();
        let span = tracing::info_span!(
            "flow",
            trace_id = %trace_id,
            provider = self.provider.name(),
            model = %request.model,
            stream = request.stream,
        );

        self.run(&trace_id, request).instrument(span).await
    }

    async fn run(&self, trace_id: &TraceId, request: CompletionRequest) -> Result<FlowResponse, LlmError> {
        let provider = self.provider.name();

        self.audit.emit(
            Event::builder(trace_id, EventType::LlmRequest)
                .provider(provider)
                .model(&request.model)
                .hash(hash_content(&request.to_canonical_json()))
                .stream(request.stream)
                .build(),
        );

        let decision = self.policy.evaluate_model(&request.model);
        self.audit.emit(
            Event::builder(trace_id, EventType::PolicyDecision)
                .provider(provider)
                .model(&request.model)
                .decision(&decision)
                .build(),
        );

        if !decision.is_allowed() {
            tracing::info!(rule_id = %decision.rule_id, reason = %decision.reason, "model denied by policy");
            return Err(LlmError::PolicyDenied {
                reason: decision.reason,
            });
        }

        let upstream = self.provider.build_upstream_request(&request).await?;
        let upstream =
            reqwest::Request::try_from(upstream).map_err(|e| LlmError::UpstreamBuild(format!("invalid request: {e}")))?;

        let response = self.client.execute(upstream).await.map_err(|e| {
            tracing::warn!(error = %e, "upstream request failed");
            LlmError::Upstream(e.to_string())
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        tracing::debug!(status = status.as_u16(), "upstream responded");

        if request.stream {
            self.audit.emit(
                Event::builder(trace_id, EventType::LlmResponse)
                    .provider(provider)
                    .model(&request.model)
                    .stream(true)
                    .build(),
            );

            return Ok(FlowResponse {
                status,
                headers,
                body: FlowBody::Streaming(response.bytes_stream().boxed()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LlmError::Upstream(format!("reading response body: {e}")))?;

        let parsed = match self.provider.parse_upstream_response(body.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(
                    reason = e.reason(),
                    body_bytes = e.raw_body().len(),
                    "upstream response not understood; skipping tool inspection"
                );
                None
            }
        };

        let model = parsed
            .as_ref()
            .map(|p| p.model.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or(&request.model);

        self.audit.emit(
            Event::builder(trace_id, EventType::LlmResponse)
                .provider(provider)
                .model(model)
                .hash(hash_content(&body))
                .build(),
        );

        if let Some(parsed) = &parsed {
            self.inspect_tool_calls(trace_id, model, parsed);
        }

        Ok(FlowResponse {
            status,
            headers,
            body: FlowBody::Buffered(body),
        })
    }

    fn inspect_tool_calls(&self, trace_id: &TraceId, model: &str, response: &CompletionResponse) {
        let provider = self.provider.name();

        for tool in response.tool_names() {
            self.audit.emit(
                Event::builder(trace_id, EventType::ToolProposal)
                    .provider(provider)
                    .model(model)
                    .tool_name(tool)
                    .build(),
            );

            let decision = self.policy.evaluate_tool(tool);
            if !decision.is_allowed() {
                tracing::info!(tool, rule_id = %decision.rule_id, "tool call denied by policy (not enforced)");
            }

            self.audit.emit(
                Event::builder(trace_id, EventType::PolicyDecision)
                    .provider(provider)
                    .model(model)
                    .tool_name(tool)
                    .decision(&decision)
                    .build(),
            );
        }
    }
}
