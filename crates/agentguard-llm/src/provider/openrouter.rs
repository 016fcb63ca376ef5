//! OpenRouter provider

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::SecretString;
use url::Url;

use super::{Provider, build_error, encode_error, json_post, trim_base};
use crate::error::{LlmError, ParseError};
use crate::protocol::openai;
use crate::types::{CompletionRequest, CompletionResponse};

/// Default OpenRouter API base URL
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Adapter for OpenRouter's OpenAI-compatible API
pub struct OpenRouterProvider {
    endpoint: String,
    api_key: Option<SecretString>,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenRouterProvider {
    /// Create an adapter posting to `<base_url>/chat/completions`
    ///
    /// Without a base URL the public OpenRouter API is used. Referer and
    /// title are sent as attribution headers when non-empty.
    pub fn new(
        base_url: Option<&Url>,
        api_key: Option<SecretString>,
        referer: Option<String>,
        title: Option<String>,
    ) -> Self {
        let base = base_url.map_or_else(|| DEFAULT_BASE_URL.to_owned(), trim_base);

        Self {
            endpoint: format!("{base}/chat/completions"),
            api_key,
            referer: referer.filter(|r| !r.is_empty()),
            title: title.filter(|t| !t.is_empty()),
        }
    }

    #[cfg(test)]
    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn build_upstream_request(&self, request: &CompletionRequest) -> Result<http::Request<Bytes>, LlmError> {
        let body = openai::encode_request(request).map_err(encode_error)?;

        let mut builder = json_post(&self.endpoint, self.api_key.as_ref())?;
        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            builder = builder.header("X-Title", title);
        }

        builder.body(Bytes::from(body)).map_err(build_error)
    }

    fn parse_upstream_response(&self, body: Bytes) -> Result<CompletionResponse, ParseError> {
        openai::parse_response(body)
    }
}
