use agentguard_core::HttpError;
use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

/// Errors that can occur while processing a chat-completion request
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client body could not be decoded into a canonical request
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Requested model is not permitted by policy
    #[error("{reason}")]
    PolicyDenied { reason: String },

    /// Upstream request could not be built or signed
    #[error("building upstream request: {0}")]
    UpstreamBuild(String),

    /// Upstream could not be reached or its body could not be read
    #[error("upstream error: {0}")]
    Upstream(String),

    /// No provider is registered under the configured type name
    #[error("unsupported provider type: {0}")]
    UnsupportedProvider(String),

    /// Provider settings are missing or invalid
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Rejections produced by the inbound decoder
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not a valid request object
    #[error("invalid JSON request: {0}")]
    Malformed(String),

    /// Non-whitespace bytes follow the request object
    #[error("invalid trailing data after JSON request")]
    TrailingData,
}

/// An upstream body the adapter could not interpret
///
/// Always carries the raw body so the pass-through path never depends on
/// the adapter understanding the upstream's response shape.
#[derive(Debug, Error)]
#[error("parsing upstream response: {reason}")]
pub struct ParseError {
    reason: String,
    raw_body: Bytes,
}

impl ParseError {
    pub fn new(reason: impl Into<String>, raw_body: Bytes) -> Self {
        Self {
            reason: reason.into(),
            raw_body,
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub const fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }
}

impl HttpError for LlmError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::PolicyDenied { .. } => StatusCode::FORBIDDEN,
            Self::UpstreamBuild(_)
            | Self::Upstream(_)
            | Self::UnsupportedProvider(_)
            | Self::InvalidConfig(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Decode(_) => "invalid_request_error",
            Self::PolicyDenied { .. } => "policy_error",
            Self::Upstream(_) => "upstream_error",
            Self::UpstreamBuild(_) | Self::UnsupportedProvider(_) | Self::InvalidConfig(_) | Self::Internal(_) => {
                "internal_error"
            }
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Self::Decode(DecodeError::Malformed(_)) => "invalid_json",
            Self::Decode(DecodeError::TrailingData) => "trailing_data",
            Self::PolicyDenied { .. } => "policy_denied",
            Self::Upstream(_) => "upstream_unavailable",
            Self::UpstreamBuild(_) | Self::UnsupportedProvider(_) | Self::InvalidConfig(_) | Self::Internal(_) => {
                "internal_error"
            }
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Decode(_) | Self::PolicyDenied { .. } => self.to_string(),
            _ => "an internal error occurred".to_owned(),
        }
    }
}
