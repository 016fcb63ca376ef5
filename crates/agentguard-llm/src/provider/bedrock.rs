//! AWS Bedrock provider using the Converse API over signed HTTP

use async_trait::async_trait;
use bytes::Bytes;
use http::header::ACCEPT;
use jiff::Timestamp;
use url::Url;

use super::credentials::SharedCredentialSource;
use super::signer::{SigV4Signer, uri_encode};
use super::{Provider, build_error, encode_error, json_post, trim_base};
use crate::error::{LlmError, ParseError};
use crate::protocol::bedrock;
use crate::types::{CompletionRequest, CompletionResponse};

/// Signing service name for the Bedrock runtime
const SERVICE: &str = "bedrock";

/// Bedrock Converse adapter
pub struct BedrockProvider {
    endpoint: String,
    signer: SigV4Signer,
    credentials: SharedCredentialSource,
}

impl BedrockProvider {
    /// Create an adapter for `region`
    ///
    /// Without an explicit endpoint the regional runtime endpoint
    /// `https://bedrock-runtime.<region>.amazonaws.com` is used.
    pub fn new(region: &str, endpoint: Option<&Url>, credentials: SharedCredentialSource) -> Self {
        let endpoint = endpoint.map_or_else(|| format!("https://bedrock-runtime.{region}.amazonaws.com"), trim_base);

        Self {
            endpoint,
            signer: SigV4Signer::new(region, SERVICE),
            credentials,
        }
    }

    #[cfg(test)]
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url_for(&self, request: &CompletionRequest) -> String {
        let action = if request.stream { "converse-stream" } else { "converse" };
        format!("{}/model/{}/{action}", self.endpoint, uri_encode(&request.model))
    }
}

#[async_trait]
impl Provider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn build_upstream_request(&self, request: &CompletionRequest) -> Result<http::Request<Bytes>, LlmError> {
        let body = serde_json::to_vec(&bedrock::build_request(request)).map_err(encode_error)?;

        let accept = if request.stream {
            "application/vnd.amazon.eventstream"
        } else {
            "application/json"
        };

        let mut upstream = json_post(&self.url_for(request), None)?
            .header(ACCEPT, accept)
            .body(Bytes::from(body))
            .map_err(build_error)?;

        let credentials = self
            .credentials
            .retrieve()
            .await
            .map_err(|e| LlmError::UpstreamBuild(format!("retrieving aws credentials: {e}")))?;

        self.signer.sign(&mut upstream, &credentials, Timestamp::now())?;

        tracing::debug!(uri = %upstream.uri(), "signed bedrock request");

        Ok(upstream)
    }

    fn parse_upstream_response(&self, body: Bytes) -> Result<CompletionResponse, ParseError> {
        bedrock::parse_response(body)
    }
}
