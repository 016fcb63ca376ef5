//! OpenAI-compatible provider

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::SecretString;
use url::Url;

use super::{Provider, build_error, encode_error, json_post, trim_base};
use crate::error::{LlmError, ParseError};
use crate::protocol::openai;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for `OpenAI` and any server speaking its chat completion API
pub struct OpenAiProvider {
    endpoint: String,
    api_key: Option<SecretString>,
}

impl OpenAiProvider {
    /// Create an adapter posting to `<base_url>/v1/chat/completions`
    pub fn new(base_url: &Url, api_key: Option<SecretString>) -> Self {
        Self {
            endpoint: format!("{}/v1/chat/completions", trim_base(base_url)),
            api_key,
        }
    }

    #[cfg(test)]
    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn build_upstream_request(&self, request: &CompletionRequest) -> Result<http::Request<Bytes>, LlmError> {
        let body = openai::encode_request(request).map_err(encode_error)?;

        json_post(&self.endpoint, self.api_key.as_ref())?
            .body(Bytes::from(body))
            .map_err(build_error)
    }

    fn parse_upstream_response(&self, body: Bytes) -> Result<CompletionResponse, ParseError> {
        openai::parse_response(body)
    }
}

#[cfg(test)]
mod tests {
    use http::header::{AUTHORIZATION, CONTENT_TYPE};

    use super::*;
    use crate::types::{Message, Role};

    fn request() -> CompletionRequest {
        CompletionRequest::new("gpt-4o", vec![Message::new(Role::User, "hi")])
    }

    #[tokio::test]
    async fn builds_bearer_authenticated_post() {
        let base = Url::parse("https://api.openai.com/").unwrap();
        let provider = OpenAiProvider::new(&base, Some(SecretString::from("sk-test")));

        let upstream = provider.build_upstream_request(&request()).await.unwrap();

        assert_eq!(upstream.method(), http::Method::POST);
        assert_eq!(upstream.uri(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(upstream.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(upstream.headers()[AUTHORIZATION], "Bearer sk-test");
        assert!(upstream.headers()[AUTHORIZATION].is_sensitive());

        let body: serde_json::Value = serde_json::from_slice(upstream.body()).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert!(body.get("stream").is_none());
    }

    #[tokio::test]
    async fn omits_authorization_without_key() {
        let base = Url::parse("http://localhost:11434").unwrap();
        let provider = OpenAiProvider::new(&base, Some(SecretString::from("")));

        let upstream = provider.build_upstream_request(&request()).await.unwrap();
        assert_eq!(upstream.uri(), "http://localhost:11434/v1/chat/completions");
        assert!(upstream.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn keeps_base_path() {
        let base = Url::parse("https://llm.internal/proxy/").unwrap();
        let provider = OpenAiProvider::new(&base, None);
        assert_eq!(provider.endpoint(), "https://llm.internal/proxy/v1/chat/completions");
    }
}
