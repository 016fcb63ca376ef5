//! Axum route handler for the OpenAI-compatible chat completion endpoint

use std::sync::Arc;

use agentguard_core::HttpError;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use http::{HeaderMap, HeaderName};

use crate::error::LlmError;
use crate::flow::{Flow, FlowBody, FlowResponse};
use crate::normalize::decode_request;

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Build the LLM router
pub fn llm_router(flow: Arc<Flow>) -> Router {
    Router::new()
        .route("/v1/chat/completions", routing::post(chat_completions))
        .with_state(flow)
}

/// Handle `POST /v1/chat/completions`
///
/// The body is taken as raw bytes so the strict decoder sees exactly what
/// the client sent.
async fn chat_completions(State(flow): State<Arc<Flow>>, body: Bytes) -> Response {
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "rejected request body");
            return error_response(&LlmError::from(e));
        }
    };

    match flow.process(request).await {
        Ok(response) => upstream_response(response),
        Err(e) => {
            if matches!(e, LlmError::UpstreamBuild(_) | LlmError::Upstream(_) | LlmError::Internal(_)) {
                tracing::error!(error = %e, "request failed");
            }
            error_response(&e)
        }
    }
}

/// Relay the upstream status, headers and body
fn upstream_response(upstream: FlowResponse) -> Response {
    let body = match upstream.body {
        FlowBody::Buffered(bytes) => Body::from(bytes),
        FlowBody::Streaming(stream) => Body::from_stream(stream),
    };

    let mut response = Response::new(body);
    *response.status_mut() = upstream.status;
    copy_end_to_end_headers(&upstream.headers, response.headers_mut());

    response
}

/// Copy every header except the hop-by-hop ones, which describe the
/// upstream connection rather than the message
fn copy_end_to_end_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from {
        if !is_hop_by_hop(name) {
            to.append(name.clone(), value.clone());
        }
    }
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Convert an error to an `OpenAI`-style JSON error response
fn error_response(error: &LlmError) -> Response {
    let body = serde_json::json!({
        "error": {
            "message": error.client_message(),
            "type": error.error_type(),
            "code": error.error_code(),
        }
    });

    (error.status_code(), Json(body)).into_response()
}
