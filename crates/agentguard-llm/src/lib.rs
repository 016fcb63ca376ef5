//! Request pipeline and provider normalization for AgentGuard
//!
//! Decodes client chat-completion requests into a provider-agnostic
//! canonical model, enforces model policy, translates to the configured
//! upstream's wire protocol (`OpenAI`-compatible, OpenRouter, or Bedrock
//! Converse with SigV4 signing), and audits every step.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
pub mod flow;
#[cfg(feature = "http")]
pub mod handler;
pub mod normalize;
pub mod protocol;
pub mod provider;
pub mod types;

pub use error::{DecodeError, LlmError, ParseError};
pub use flow::{Flow, FlowBody, FlowResponse};
#[cfg(feature = "http")]
pub use handler::llm_router;
pub use normalize::decode_request;
pub use provider::{Provider, ProviderRegistry};
pub use types::{CompletionRequest, CompletionResponse};
