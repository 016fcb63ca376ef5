//! Provider trait and adapters for upstream LLM APIs

pub mod bedrock;
pub mod credentials;
pub mod openai;
pub mod openrouter;
pub mod registry;
pub mod signer;

use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderValue;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{LlmError, ParseError};
use crate::types::{CompletionRequest, CompletionResponse};

pub use registry::{ProviderFactory, ProviderRegistry};

/// Adapter between the canonical model and one upstream wire protocol
///
/// Adapters only build requests and interpret bodies. Sending is done by
/// the flow so that transport, streaming and pass-through stay uniform.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider name recorded in audit events
    fn name(&self) -> &str;

    /// Build the complete upstream HTTP request, signed if required
    async fn build_upstream_request(&self, request: &CompletionRequest) -> Result<http::Request<Bytes>, LlmError>;

    /// Interpret a buffered upstream body
    ///
    /// On failure the error still carries the raw body for pass-through.
    fn parse_upstream_response(&self, body: Bytes) -> Result<CompletionResponse, ParseError>;
}

/// Start a JSON `POST` request, with an optional bearer token
pub(crate) fn json_post(url: &str, api_key: Option<&SecretString>) -> Result<http::request::Builder, LlmError> {
    let mut builder = http::Request::post(url).header(CONTENT_TYPE, "application/json");

    if let Some(key) = api_key.filter(|key| !key.expose_secret().is_empty()) {
        let mut value = HeaderValue::try_from(format!("Bearer {}", key.expose_secret()))
            .map_err(|_| LlmError::UpstreamBuild("api key is not a valid header value".to_owned()))?;
        value.set_sensitive(true);
        builder = builder.header(AUTHORIZATION, value);
    }

    Ok(builder)
}

/// Base URL as a string without its trailing slash
pub(crate) fn trim_base(url: &url::Url) -> String {
    url.as_str().trim_end_matches('/').to_owned()
}

fn build_error(e: impl std::fmt::Display) -> LlmError {
    LlmError::UpstreamBuild(format!("creating HTTP request: {e}"))
}

fn encode_error(e: impl std::fmt::Display) -> LlmError {
    LlmError::UpstreamBuild(format!("marshaling request: {e}"))
}
